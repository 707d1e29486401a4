//! # Storage
//!
//! SQLite persistence through sqlx plus the web-root file area.
//! Repositories return `sqlx::Result`; services translate failures into
//! domain errors.

pub mod connection;
pub mod files;
pub mod repositories;

pub use connection::DbConnection;
pub use files::FileStore;
pub use repositories::{
    JiuJitsuRepository, MemberRepository, MensGroupRepository, MusicSchoolRepository,
    PreRegistrationRepository, PresentationRepository, StoredUser, UserRepository,
};
