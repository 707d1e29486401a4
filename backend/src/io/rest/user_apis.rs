//! # REST API for Back Office Users
//!
//! Admin-only. The router is mounted behind both the bearer and the admin
//! middleware.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use shared::{CreateUserRequest, UpdateUserRequest};
use tracing::info;

use crate::domain::auth::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/users");

    match state.user_service.list().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/users/{}", id);

    match state.user_service.get(id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - {} (by {})", request.email, admin.email);

    match state.user_service.create(request).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/{} (by {})", id, admin.email);

    match state.user_service.update(id, request).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/users/{} (by {})", id, admin.email);

    match state.user_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
