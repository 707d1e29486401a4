//! # REST API for the Men's Group

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::{ListQuery, MensGroupMemberRequest};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/stats", get(get_mens_group_stats))
        .route("/:id", get(get_member).put(update_member).delete(delete_member))
}

pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    info!("GET /api/mensgroup - include inactive: {}", query.include_inactive);

    match state.mens_group_service.list(query.include_inactive).await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_member(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/mensgroup/{}", id);

    match state.mens_group_service.get(id).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<MensGroupMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/mensgroup - {}", request.name);

    match state.mens_group_service.create(request).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MensGroupMemberRequest>,
) -> impl IntoResponse {
    info!("PUT /api/mensgroup/{}", id);

    match state.mens_group_service.update(id, request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_member(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("DELETE /api/mensgroup/{}", id);

    match state.mens_group_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_mens_group_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/mensgroup/stats");

    match state.mens_group_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
