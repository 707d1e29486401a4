//! # REST API for Public Pre-registration
//!
//! Unauthenticated form used by prospective music school students, plus the
//! option lists the form is built from.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{
    ClassTypesResponse, InstrumentsResponse, LevelsResponse, PreRegistrationCreatedResponse,
    PreRegistrationRequest,
};
use tracing::info;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/music-school", post(submit_pre_registration))
        .route("/music-school/instruments", get(get_instruments))
        .route("/music-school/levels", get(get_levels))
        .route("/music-school/class-types", get(get_class_types))
}

pub async fn submit_pre_registration(
    State(state): State<AppState>,
    Json(request): Json<PreRegistrationRequest>,
) -> impl IntoResponse {
    info!("POST /api/preregistration/music-school - {}", request.email);

    match state.pre_registration_service.submit(request).await {
        Ok(data) => (
            StatusCode::CREATED,
            Json(PreRegistrationCreatedResponse {
                message: "Pré-matrícula realizada com sucesso! Entraremos em contato em breve."
                    .to_string(),
                data,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_instruments(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/preregistration/music-school/instruments");
    Json(InstrumentsResponse {
        instruments: state.pre_registration_service.instruments(),
    })
}

pub async fn get_levels(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/preregistration/music-school/levels");
    Json(LevelsResponse {
        levels: state.pre_registration_service.levels(),
    })
}

pub async fn get_class_types(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/preregistration/music-school/class-types");
    Json(ClassTypesResponse {
        class_types: state.pre_registration_service.class_types(),
    })
}
