//! # REST API for the Dashboard

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_dashboard_stats))
}

/// Headline counts across every module
pub async fn get_dashboard_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard/stats");

    match state.dashboard_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
