//! # REST API for the Jiu-Jitsu Academy
//!
//! Student CRUD plus the graduation, attendance and payment histories hanging
//! off each student.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use shared::{
    BulkAttendanceRequest, CreateAttendanceRequest, CreateGraduationRequest, CreatePaymentRequest,
    JiuJitsuStudentRequest, ListQuery,
};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/stats", get(get_jiu_jitsu_stats))
        .route("/attendances/bulk", post(add_bulk_attendance))
        .route("/:id", get(get_student).put(update_student).delete(delete_student))
        .route("/:id/graduations", post(add_graduation))
        .route("/:id/graduations/:graduation_id", delete(remove_graduation))
        .route("/:id/attendances", post(add_attendance))
        .route("/:id/attendances/:attendance_id", delete(remove_attendance))
        .route("/:id/payments", post(add_payment))
        .route("/:id/payments/:payment_id", delete(remove_payment))
}

pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    info!("GET /api/jiujitsu - include inactive: {}", query.include_inactive);

    match state.jiu_jitsu_service.list(query.include_inactive).await {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Student with age and their most recent history entries
pub async fn get_student(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("GET /api/jiujitsu/{}", id);

    match state.jiu_jitsu_service.get(id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<JiuJitsuStudentRequest>,
) -> impl IntoResponse {
    info!("POST /api/jiujitsu - {}", request.name);

    match state.jiu_jitsu_service.create(request).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<JiuJitsuStudentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/jiujitsu/{}", id);

    match state.jiu_jitsu_service.update(id, request).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_student(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    info!("DELETE /api/jiujitsu/{}", id);

    match state.jiu_jitsu_service.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_graduation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateGraduationRequest>,
) -> impl IntoResponse {
    info!("POST /api/jiujitsu/{}/graduations - {}", id, request.to_belt);

    match state.jiu_jitsu_service.add_graduation(id, request).await {
        Ok(graduation) => (StatusCode::CREATED, Json(graduation)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_graduation(
    State(state): State<AppState>,
    Path((id, graduation_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!("DELETE /api/jiujitsu/{}/graduations/{}", id, graduation_id);

    match state.jiu_jitsu_service.remove_graduation(id, graduation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_attendance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateAttendanceRequest>,
) -> impl IntoResponse {
    info!("POST /api/jiujitsu/{}/attendances", id);

    match state.jiu_jitsu_service.add_attendance(id, request).await {
        Ok(attendance) => (StatusCode::CREATED, Json(attendance)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// One class for many students; nothing is written if any student is unknown
pub async fn add_bulk_attendance(
    State(state): State<AppState>,
    Json(request): Json<BulkAttendanceRequest>,
) -> impl IntoResponse {
    info!("POST /api/jiujitsu/attendances/bulk - {} students", request.students.len());

    match state.jiu_jitsu_service.add_bulk_attendance(request).await {
        Ok(attendances) => (StatusCode::CREATED, Json(attendances)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_attendance(
    State(state): State<AppState>,
    Path((id, attendance_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!("DELETE /api/jiujitsu/{}/attendances/{}", id, attendance_id);

    match state.jiu_jitsu_service.remove_attendance(id, attendance_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn add_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/jiujitsu/{}/payments - amount {}", id, request.amount);

    match state.jiu_jitsu_service.add_payment(id, request).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_payment(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    info!("DELETE /api/jiujitsu/{}/payments/{}", id, payment_id);

    match state.jiu_jitsu_service.remove_payment(id, payment_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_jiu_jitsu_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/jiujitsu/stats");

    match state.jiu_jitsu_service.stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}
