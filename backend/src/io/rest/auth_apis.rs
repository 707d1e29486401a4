//! # REST API for Authentication
//!
//! Login is public; token validation sits behind the bearer middleware.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Extension, Router,
};
use shared::{LoginRequest, ValidateTokenResponse};
use tracing::info;

use crate::domain::auth::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/login - {}", request.email);

    match state.auth_service.login(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Echo the identity behind the presented token
pub async fn validate_token(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
    info!("GET /api/auth/validate - user {}", user.id);
    (StatusCode::OK, Json(ValidateTokenResponse::from(user)))
}
