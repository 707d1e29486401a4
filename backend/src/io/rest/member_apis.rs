//! # REST API for Church Members
//!
//! Member CRUD, photo upload, family members and membership statistics.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use shared::{FamilyMemberRequest, ListQuery, MemberRequest};
use tracing::{info, warn};

use crate::domain::DomainError;
use crate::AppState;

const PHOTO_FIELD: &str = "photo";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/stats", get(get_member_stats))
        .route("/:id", get(get_member).put(update_member).delete(delete_member))
        .route("/:id/photo", post(upload_photo))
        .route("/:id/family", post(add_family_member))
        .route(
            "/:id/family/:family_id",
            put(update_family_member).delete(remove_family_member),
        )
}

pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    info!("GET /api/members - include inactive: {}", query.include_inactive);

    match state.member_service.list(query.include_inactive).await {
        Ok(members) => (StatusCode::OK, Json(members)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_member(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/members/{}", id);

    match state.member_service.get(id).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_member(
    State(state): State<AppState>,
    Json(request): Json<MemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - {}", request.full_name);

    match state.member_service.create(request).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MemberRequest>,
) -> impl IntoResponse {
    info!("PUT /api/members/{}", id);

    match state.member_service.update(id, request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_member(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("DELETE /api/members/{}", id);

    match state.member_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Multipart upload; the file must be sent in the `photo` field
pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    info!("POST /api/members/{}/photo", id);

    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(PHOTO_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((file_name, bytes)),
                    Err(e) => {
                        warn!("Failed to read photo upload for member {}: {}", id, e);
                        return DomainError::validation(PHOTO_FIELD, "Falha ao ler o arquivo enviado")
                            .into_response();
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body for member {}: {}", id, e);
                return DomainError::validation(PHOTO_FIELD, "Requisição multipart inválida")
                    .into_response();
            }
        }
    }

    let (file_name, bytes) = upload.unwrap_or_default();
    match state.member_service.upload_photo(id, &file_name, &bytes).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_member_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/members/stats");

    match state.member_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_family_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<FamilyMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members/{}/family", id);

    match state.member_service.add_family_member(id, request).await {
        Ok(family) => (StatusCode::CREATED, Json(family)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_family_member(
    State(state): State<AppState>,
    Path((id, family_id)): Path<(i64, i64)>,
    Json(request): Json<FamilyMemberRequest>,
) -> impl IntoResponse {
    info!("PUT /api/members/{}/family/{}", id, family_id);

    match state.member_service.update_family_member(id, family_id, request).await {
        Ok(family) => (StatusCode::OK, Json(family)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_family_member(
    State(state): State<AppState>,
    Path((id, family_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!("DELETE /api/members/{}/family/{}", id, family_id);

    match state.member_service.remove_family_member(id, family_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
