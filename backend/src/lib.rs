//! # Church Administration Back Office
//!
//! REST back office for a church: members and their families, the music
//! school and its public pre-registration, the jiu-jitsu academy, the men's
//! group, child presentations with PDF certificates, and staff accounts.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, auth middleware)
//!     ↓
//! Domain Layer (services, validation, statistics, certificates)
//!     ↓
//! Storage Layer (SQLite repositories, web-root files)
//! ```
//!
//! `initialize_backend` wires the services from a [`Config`];
//! `create_router` mounts the API, the uploads directory and the optional
//! admin UI.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use config::Config;

use crate::domain::auth::JwtValidator;
use crate::domain::certificate::CertificateStore;
use crate::domain::{
    AuthService, Clock, DashboardService, JiuJitsuService, MemberService, MensGroupService,
    MusicSchoolService, PreRegistrationService, PresentationService, SystemClock, UserService,
};
use crate::storage::{
    DbConnection, FileStore, JiuJitsuRepository, MemberRepository, MensGroupRepository,
    MusicSchoolRepository, PresentationRepository, UserRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub member_service: MemberService,
    pub music_school_service: MusicSchoolService,
    pub pre_registration_service: PreRegistrationService,
    pub jiu_jitsu_service: JiuJitsuService,
    pub mens_group_service: MensGroupService,
    pub presentation_service: PresentationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Wire every service over one database, one web root and one clock
    pub fn new(db: DbConnection, files: FileStore, jwt: JwtValidator, clock: Arc<dyn Clock>) -> Self {
        Self {
            auth_service: AuthService::new(UserRepository::new(db.clone()), jwt, clock.clone()),
            user_service: UserService::new(UserRepository::new(db.clone()), clock.clone()),
            member_service: MemberService::new(
                MemberRepository::new(db.clone()),
                files.clone(),
                clock.clone(),
            ),
            music_school_service: MusicSchoolService::new(
                MusicSchoolRepository::new(db.clone()),
                clock.clone(),
            ),
            pre_registration_service: PreRegistrationService::new(db.clone(), clock.clone()),
            jiu_jitsu_service: JiuJitsuService::new(JiuJitsuRepository::new(db.clone()), clock.clone()),
            mens_group_service: MensGroupService::new(MensGroupRepository::new(db.clone()), clock.clone()),
            presentation_service: PresentationService::new(
                PresentationRepository::new(db.clone()),
                CertificateStore::new(files),
                clock,
            ),
            dashboard_service: DashboardService::new(db),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Using web root {}", config.web_root.display());
    let files = FileStore::new(config.web_root.clone());

    let jwt = jwt_validator(config)?;

    info!("Setting up application state");
    let state = AppState::new(db, files, jwt, Arc::new(SystemClock));

    state
        .auth_service
        .ensure_admin(&config.admin_email, &config.admin_password)
        .await?;

    Ok(state)
}

fn jwt_validator(config: &Config) -> Result<JwtValidator> {
    match config.jwt_secret() {
        None if config.dev_mode => {
            warn!("DEV_MODE without JWT_SECRET: tokens are signed with a built-in secret");
            Ok(JwtValidator::new_dev(
                config.jwt_issuer.clone(),
                config.jwt_audience.clone(),
            ))
        }
        secret => JwtValidator::new(
            secret.unwrap_or_default().to_string(),
            config.jwt_expiry_seconds,
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
        ),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        .nest("/api", io::rest::api_router(app_state.clone()))
        .nest_service("/uploads", ServeDir::new(config.uploads_dir()));

    if let Some(static_dir) = &config.static_dir {
        info!("Serving admin UI from {}", static_dir.display());
        let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
        router = router.fallback_service(spa);
    }

    router
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .origins()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}
