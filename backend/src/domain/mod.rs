pub mod auth;
pub mod auth_service;
pub mod certificate;
pub mod clock;
pub mod dashboard_service;
pub mod errors;
pub mod jiu_jitsu_service;
pub mod member_service;
pub mod mens_group_service;
pub mod music_school_service;
pub mod pre_registration_service;
pub mod presentation_service;
pub mod statistics;
pub mod user_service;
pub mod validation;

pub use auth_service::AuthService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard_service::DashboardService;
pub use errors::{DomainError, DomainResult};
pub use jiu_jitsu_service::JiuJitsuService;
pub use member_service::MemberService;
pub use mens_group_service::MensGroupService;
pub use music_school_service::MusicSchoolService;
pub use pre_registration_service::PreRegistrationService;
pub use presentation_service::{CertificateDownload, PresentationService};
pub use user_service::UserService;
