//! Bearer token middleware.
//!
//! `require_auth` resolves the `Authorization: Bearer <jwt>` header into an
//! [`AuthenticatedUser`] request extension. `require_admin` runs after it on
//! the user management routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::DomainError;
use crate::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token.to_string(),
        None => {
            warn!("Missing bearer token for {} {}", request.method(), request.uri().path());
            return DomainError::Unauthorized("Token não fornecido".to_string()).into_response();
        }
    };

    match state.auth_service.authenticate(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(user) => {
            warn!("User {} is not allowed on {}", user.email, request.uri().path());
            DomainError::Forbidden("Acesso restrito a administradores".to_string()).into_response()
        }
        None => DomainError::Unauthorized("Token não fornecido".to_string()).into_response(),
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
