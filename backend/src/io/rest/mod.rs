//! # REST API Interface Layer
//!
//! HTTP endpoints for the back office, all mounted under `/api`.
//! This layer handles:
//! - JSON request/response (de)serialization
//! - Bearer authentication and the admin role check
//! - Translating domain errors into status codes and error bodies
//!
//! Handlers stay thin: they log the request, call one service method and
//! shape the response. Business rules live in `crate::domain`.

pub mod auth;
pub mod auth_apis;
pub mod dashboard_apis;
pub mod error_response;
pub mod jiu_jitsu_apis;
pub mod member_apis;
pub mod mens_group_apis;
pub mod music_school_apis;
pub mod pre_registration_apis;
pub mod presentation_apis;
pub mod user_apis;

use axum::{middleware, routing::get, Router};

use crate::AppState;

/// Every `/api` route, with bearer and admin checks applied per group
pub fn api_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .nest("/auth", auth_apis::router())
        .nest("/preregistration", pre_registration_apis::router());

    let admin_only = Router::new()
        .nest("/users", user_apis::router())
        .route_layer(middleware::from_fn(auth::require_admin));

    let authenticated = Router::new()
        .route("/auth/validate", get(auth_apis::validate_token))
        .nest("/members", member_apis::router())
        .nest("/musicschool", music_school_apis::router())
        .nest("/jiujitsu", jiu_jitsu_apis::router())
        .nest("/mensgroup", mens_group_apis::router())
        .nest("/childpresentation", presentation_apis::router())
        .nest("/dashboard", dashboard_apis::router())
        .merge(admin_only)
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth));

    public.merge(authenticated)
}
