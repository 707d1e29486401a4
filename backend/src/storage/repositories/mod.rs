pub mod jiu_jitsu_repository;
pub mod member_repository;
pub mod mens_group_repository;
pub mod music_school_repository;
pub mod pre_registration_repository;
pub mod presentation_repository;
pub mod user_repository;

pub use jiu_jitsu_repository::JiuJitsuRepository;
pub use member_repository::MemberRepository;
pub use mens_group_repository::MensGroupRepository;
pub use music_school_repository::MusicSchoolRepository;
pub use pre_registration_repository::PreRegistrationRepository;
pub use presentation_repository::PresentationRepository;
pub use user_repository::{StoredUser, UserRepository};
