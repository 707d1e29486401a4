//! # REST API for the Music School
//!
//! Student CRUD, payment and attendance counters, and the staff side of
//! pre-registrations (triage and conversion into students).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use shared::{
    ConvertPreRegistrationRequest, ListQuery, MessageResponse, MusicSchoolStudentRequest,
    UpdatePreRegistrationRequest,
};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/stats", get(get_music_school_stats))
        .route("/pre-registrations", get(list_pre_registrations))
        .route("/pre-registrations/:id", put(update_pre_registration))
        .route("/pre-registrations/:id/convert", post(convert_pre_registration))
        .route("/:id", get(get_student).put(update_student).delete(delete_student))
        .route("/:id/payment", post(register_payment))
        .route("/:id/attendance", post(register_attendance))
}

pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    info!("GET /api/musicschool - include inactive: {}", query.include_inactive);

    match state.music_school_service.list(query.include_inactive).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_student(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/musicschool/{}", id);

    match state.music_school_service.get(id).await {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<MusicSchoolStudentRequest>,
) -> impl IntoResponse {
    info!("POST /api/musicschool - {}", request.name);

    match state.music_school_service.create(request).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MusicSchoolStudentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/musicschool/{}", id);

    match state.music_school_service.update(id, request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_student(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("DELETE /api/musicschool/{}", id);

    match state.music_school_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn register_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("POST /api/musicschool/{}/payment", id);

    match state.music_school_service.register_payment(id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("Pagamento registrado com sucesso")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn register_attendance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("POST /api/musicschool/{}/attendance", id);

    match state.music_school_service.register_attendance(id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse::new("Presença registrada com sucesso")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_music_school_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/musicschool/stats");

    match state.music_school_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_pre_registrations(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/musicschool/pre-registrations");

    match state.pre_registration_service.list().await {
        Ok(pre_registrations) => (StatusCode::OK, Json(pre_registrations)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_pre_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePreRegistrationRequest>,
) -> impl IntoResponse {
    info!("PUT /api/musicschool/pre-registrations/{} - status {}", id, request.status);

    match state.pre_registration_service.update(id, request).await {
        Ok(pre_registration) => (StatusCode::OK, Json(pre_registration)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn convert_pre_registration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ConvertPreRegistrationRequest>,
) -> impl IntoResponse {
    info!("POST /api/musicschool/pre-registrations/{}/convert", id);

    match state.pre_registration_service.convert(id, request).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => e.into_response(),
    }
}
