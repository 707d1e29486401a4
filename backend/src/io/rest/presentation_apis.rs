//! # REST API for Child Presentations
//!
//! Presentation records, their statistics and the PDF certificate:
//! `POST /:id/certificate` renders and stores a new document (optionally
//! overriding church, pastor, verse or message for that render only) and
//! `GET /:id/certificate/download` streams the stored one.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use shared::{ChildPresentationRequest, GenerateCertificateRequest, ListQuery};
use tracing::{info, warn};

use crate::domain::{CertificateDownload, DomainError, DomainResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_presentations).post(create_presentation))
        .route("/stats", get(get_presentation_stats))
        .route(
            "/:id",
            get(get_presentation).put(update_presentation).delete(delete_presentation),
        )
        .route("/:id/certificate", post(generate_certificate))
        .route("/:id/certificate/download", get(download_certificate))
}

pub async fn list_presentations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    info!("GET /api/childpresentation - include inactive: {}", query.include_inactive);

    match state.presentation_service.list(query.include_inactive).await {
        Ok(presentations) => (StatusCode::OK, Json(presentations)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_presentation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/childpresentation/{}", id);

    match state.presentation_service.get(id).await {
        Ok(presentation) => (StatusCode::OK, Json(presentation)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_presentation(
    State(state): State<AppState>,
    Json(request): Json<ChildPresentationRequest>,
) -> impl IntoResponse {
    info!("POST /api/childpresentation - {}", request.child_name);

    match state.presentation_service.create(request).await {
        Ok(presentation) => (StatusCode::CREATED, Json(presentation)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_presentation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ChildPresentationRequest>,
) -> impl IntoResponse {
    info!("PUT /api/childpresentation/{}", id);

    match state.presentation_service.update(id, request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_presentation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/childpresentation/{}", id);

    match state.presentation_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_presentation_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/childpresentation/stats");

    match state.presentation_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The overrides body is optional; an empty body renders the stored values
pub async fn generate_certificate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> impl IntoResponse {
    info!("POST /api/childpresentation/{}/certificate", id);

    let overrides = match parse_overrides(&body) {
        Ok(overrides) => overrides,
        Err(e) => {
            warn!("Rejected certificate overrides for presentation {}", id);
            return e.into_response();
        }
    };
    match state.presentation_service.generate_certificate(id, overrides).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Blank bodies mean no overrides; anything else must be a valid overrides object
fn parse_overrides(body: &[u8]) -> DomainResult<GenerateCertificateRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateCertificateRequest::default());
    }
    serde_json::from_slice(body).map_err(|_| DomainError::validation("body", "JSON inválido"))
}

pub async fn download_certificate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/childpresentation/{}/certificate/download", id);

    match state.presentation_service.download_certificate(id).await {
        Ok(download) => pdf_attachment(download),
        Err(e) => e.into_response(),
    }
}

fn pdf_attachment(download: CertificateDownload) -> Response {
    let disposition = content_disposition(&download.file_name);
    let mut response = (StatusCode::OK, download.bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// `attachment` with an ASCII `filename` and the exact UTF-8 name in `filename*`
fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}
