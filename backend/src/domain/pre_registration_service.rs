//! # Pre-registration Service
//!
//! Public music-school intake. Visitors submit a form without logging in;
//! staff follow up, annotate and finally convert the request into an
//! enrolled [`MusicSchoolStudent`].

use std::sync::Arc;
use tracing::{info, warn};

use shared::{
    ConvertPreRegistrationRequest, MusicSchoolStudent, PreRegistration, PreRegistrationRequest,
    UpdatePreRegistrationRequest, CLASS_TYPES, DEFAULT_CLASS_TYPE, DEFAULT_MUSIC_LEVEL,
    DEFAULT_STUDENT_STATUS, INSTRUMENTS, LEVELS, PAYMENT_STATUS_UP_TO_DATE,
    PRE_REGISTRATION_CONTACTED, PRE_REGISTRATION_ENROLLED, PRE_REGISTRATION_PENDING,
    PRE_REGISTRATION_REJECTED,
};

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::validation::{clean, or_default, Validator};
use crate::storage::{DbConnection, MusicSchoolRepository, PreRegistrationRepository};

const STATUSES: [&str; 4] = [
    PRE_REGISTRATION_PENDING,
    PRE_REGISTRATION_CONTACTED,
    PRE_REGISTRATION_ENROLLED,
    PRE_REGISTRATION_REJECTED,
];

#[derive(Clone)]
pub struct PreRegistrationService {
    db: DbConnection,
    pre_registrations: PreRegistrationRepository,
    students: MusicSchoolRepository,
    clock: Arc<dyn Clock>,
}

impl PreRegistrationService {
    pub fn new(db: DbConnection, clock: Arc<dyn Clock>) -> Self {
        Self {
            pre_registrations: PreRegistrationRepository::new(db.clone()),
            students: MusicSchoolRepository::new(db.clone()),
            db,
            clock,
        }
    }

    /// Public submission; always starts as `Pendente`
    pub async fn submit(&self, request: PreRegistrationRequest) -> DomainResult<PreRegistration> {
        info!("New music school pre-registration from {}", request.email);
        validate_submission(&request)?;

        let mut pre = PreRegistration {
            id: 0,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            birth_date: request.birth_date,
            parent_name: clean(request.parent_name),
            parent_email: clean(request.parent_email),
            parent_phone: clean(request.parent_phone),
            address: clean(request.address),
            neighborhood: clean(request.neighborhood),
            city: clean(request.city),
            state: clean(request.state),
            zip_code: clean(request.zip_code),
            instrument: request.instrument.trim().to_string(),
            level: or_default(request.level, DEFAULT_MUSIC_LEVEL),
            preferred_class_type: or_default(request.preferred_class_type, DEFAULT_CLASS_TYPE),
            preferred_schedule: clean(request.preferred_schedule),
            has_musical_experience: request.has_musical_experience,
            musical_experience: clean(request.musical_experience),
            questions: clean(request.questions),
            pre_registration_date: self.clock.now(),
            status: PRE_REGISTRATION_PENDING.to_string(),
            contact_date: None,
            admin_notes: None,
            is_processed: false,
        };
        pre.id = self.pre_registrations.create(&pre).await?;

        info!("Stored pre-registration {} for {}", pre.id, pre.name);
        Ok(pre)
    }

    /// Newest first
    pub async fn list(&self) -> DomainResult<Vec<PreRegistration>> {
        info!("Listing music school pre-registrations");
        Ok(self.pre_registrations.list().await?)
    }

    /// The contact date is stamped the first time the status becomes `Contatado`
    pub async fn update(
        &self,
        id: i64,
        request: UpdatePreRegistrationRequest,
    ) -> DomainResult<PreRegistration> {
        info!("Updating pre-registration {} to status {}", id, request.status);
        let existing = self.load(id).await?;

        Validator::new()
            .one_of("status", &request.status, &STATUSES)
            .finish()?;

        let contact_date = match existing.contact_date {
            None if request.status == PRE_REGISTRATION_CONTACTED => Some(self.clock.now()),
            current => current,
        };
        let admin_notes = clean(request.admin_notes);
        let is_processed = request.is_processed.unwrap_or(existing.is_processed);

        self.pre_registrations
            .update_status(id, &request.status, admin_notes.as_deref(), is_processed, contact_date)
            .await?;

        Ok(PreRegistration {
            status: request.status,
            admin_notes,
            is_processed,
            contact_date,
            ..existing
        })
    }

    /// Creates the student and marks the pre-registration enrolled, both or neither
    pub async fn convert(
        &self,
        id: i64,
        request: ConvertPreRegistrationRequest,
    ) -> DomainResult<MusicSchoolStudent> {
        info!("Converting pre-registration {} into a student", id);
        let pre = self.load(id).await?;

        Validator::new()
            .non_negative("monthlyFee", request.monthly_fee)
            .max_len_opt("teacher", request.teacher.as_deref(), 100)
            .max_len_opt("classSchedule", request.class_schedule.as_deref(), 100)
            .finish()?;

        if self.students.email_in_use(&pre.email, None).await? {
            warn!("Cannot convert pre-registration {}: email {} already enrolled", id, pre.email);
            return Err(DomainError::Conflict(
                "Já existe um aluno cadastrado com este email.".to_string(),
            ));
        }

        let mut student = MusicSchoolStudent {
            id: 0,
            name: pre.name,
            email: pre.email,
            phone: pre.phone,
            birth_date: pre.birth_date,
            parent_name: pre.parent_name,
            parent_phone: pre.parent_phone,
            instrument: pre.instrument,
            level: pre.level,
            teacher: clean(request.teacher),
            class_type: pre.preferred_class_type,
            class_schedule: clean(request.class_schedule).or(pre.preferred_schedule),
            monthly_fee: request.monthly_fee,
            payment_status: PAYMENT_STATUS_UP_TO_DATE.to_string(),
            last_payment_date: None,
            enrollment_date: self.clock.now(),
            is_active: true,
            status: DEFAULT_STUDENT_STATUS.to_string(),
            notes: pre.questions,
            progress: None,
            total_classes: 0,
            attended_classes: 0,
        };

        let mut tx = self.db.begin().await?;
        student.id = self.students.create_in(&mut tx, &student).await?;
        self.pre_registrations.mark_enrolled_in(&mut tx, id).await?;
        tx.commit().await?;

        info!("Pre-registration {} enrolled as student {}", id, student.id);
        Ok(student)
    }

    pub fn instruments(&self) -> Vec<String> {
        INSTRUMENTS.iter().map(|s| s.to_string()).collect()
    }

    pub fn levels(&self) -> Vec<String> {
        LEVELS.iter().map(|s| s.to_string()).collect()
    }

    pub fn class_types(&self) -> Vec<String> {
        CLASS_TYPES.iter().map(|s| s.to_string()).collect()
    }

    async fn load(&self, id: i64) -> DomainResult<PreRegistration> {
        self.pre_registrations.get(id).await?.ok_or_else(|| {
            warn!("Pre-registration not found: {}", id);
            DomainError::not_found("Pré-matrícula", id)
        })
    }
}

fn validate_submission(request: &PreRegistrationRequest) -> DomainResult<()> {
    Validator::new()
        .required("name", &request.name)
        .max_len("name", &request.name, 100)
        .required("email", &request.email)
        .email("email", &request.email)
        .max_len("email", &request.email, 100)
        .required("phone", &request.phone)
        .max_len("phone", &request.phone, 20)
        .max_len_opt("parentName", request.parent_name.as_deref(), 100)
        .email_opt("parentEmail", request.parent_email.as_deref())
        .max_len_opt("parentEmail", request.parent_email.as_deref(), 100)
        .max_len_opt("parentPhone", request.parent_phone.as_deref(), 20)
        .max_len_opt("address", request.address.as_deref(), 200)
        .max_len_opt("neighborhood", request.neighborhood.as_deref(), 50)
        .max_len_opt("city", request.city.as_deref(), 50)
        .max_len_opt("state", request.state.as_deref(), 2)
        .max_len_opt("zipCode", request.zip_code.as_deref(), 10)
        .required("instrument", &request.instrument)
        .max_len("instrument", &request.instrument, 50)
        .max_len_opt("level", request.level.as_deref(), 20)
        .max_len_opt("preferredClassType", request.preferred_class_type.as_deref(), 20)
        .max_len_opt("preferredSchedule", request.preferred_schedule.as_deref(), 100)
        .max_len_opt("musicalExperience", request.musical_experience.as_deref(), 500)
        .max_len_opt("questions", request.questions.as_deref(), 1000)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use chrono::NaiveDate;

    async fn setup_test() -> PreRegistrationService {
        let db = DbConnection::in_memory().await.unwrap();
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 8, 20).unwrap()));
        PreRegistrationService::new(db, clock)
    }

    fn submission(email: &str) -> PreRegistrationRequest {
        PreRegistrationRequest {
            name: "Beatriz".to_string(),
            email: email.to_string(),
            phone: "11955554444".to_string(),
            instrument: "Violino".to_string(),
            preferred_schedule: Some("Sábado 10h".to_string()),
            questions: Some("Preciso levar o instrumento?".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_submit_starts_pending() {
        let service = setup_test().await;

        let pre = service.submit(submission("bia@example.com")).await.unwrap();

        assert_eq!(pre.status, PRE_REGISTRATION_PENDING);
        assert!(!pre.is_processed);
        assert_eq!(pre.level, DEFAULT_MUSIC_LEVEL);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_contact_date_is_set_once() {
        let service = setup_test().await;
        let id = service.submit(submission("bia@example.com")).await.unwrap().id;

        let contacted = service
            .update(
                id,
                UpdatePreRegistrationRequest {
                    status: PRE_REGISTRATION_CONTACTED.to_string(),
                    admin_notes: Some("Ligar de novo".to_string()),
                    is_processed: None,
                },
            )
            .await
            .unwrap();
        let first = contacted.contact_date;
        assert!(first.is_some());

        let rejected = service
            .update(
                id,
                UpdatePreRegistrationRequest {
                    status: PRE_REGISTRATION_REJECTED.to_string(),
                    admin_notes: None,
                    is_processed: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(rejected.contact_date, first);
        assert!(rejected.is_processed);
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let service = setup_test().await;
        let id = service.submit(submission("bia@example.com")).await.unwrap().id;

        let err = service
            .update(
                id,
                UpdatePreRegistrationRequest {
                    status: "Talvez".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_convert_creates_student_and_marks_enrolled() {
        let service = setup_test().await;
        let id = service.submit(submission("bia@example.com")).await.unwrap().id;

        let student = service
            .convert(
                id,
                ConvertPreRegistrationRequest {
                    teacher: Some("Prof. Ana".to_string()),
                    class_schedule: None,
                    monthly_fee: 180.0,
                },
            )
            .await
            .unwrap();

        assert!(student.id > 0);
        assert_eq!(student.class_schedule.as_deref(), Some("Sábado 10h"));
        assert_eq!(student.notes.as_deref(), Some("Preciso levar o instrumento?"));
        assert_eq!(student.payment_status, PAYMENT_STATUS_UP_TO_DATE);

        let pre = service.load(id).await.unwrap();
        assert_eq!(pre.status, PRE_REGISTRATION_ENROLLED);
        assert!(pre.is_processed);
    }

    #[tokio::test]
    async fn test_convert_conflicts_on_existing_student_email_ignoring_case() {
        let service = setup_test().await;
        let first = service.submit(submission("bia@example.com")).await.unwrap().id;
        let second = service.submit(submission("BIA@example.com")).await.unwrap().id;
        service.convert(first, Default::default()).await.unwrap();

        let err = service.convert(second, Default::default()).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(service.load(second).await.unwrap().status, PRE_REGISTRATION_PENDING);
    }

    #[tokio::test]
    async fn test_option_lists() {
        let service = setup_test().await;

        assert_eq!(service.instruments().len(), 8);
        assert!(service.instruments().iter().any(|i| i == "Piano"));
        assert_eq!(service.levels(), vec!["Iniciante", "Intermediário", "Avançado"]);
        assert_eq!(service.class_types(), vec!["Individual", "Grupo"]);
    }
}
