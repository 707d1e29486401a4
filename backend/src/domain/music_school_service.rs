//! # Music School Service
//!
//! Enrolled music-school students: CRUD, monthly payments, class attendance
//! and the summary shown on the music-school page.

use std::sync::Arc;
use tracing::{info, warn};

use shared::{
    MusicSchoolStats, MusicSchoolStudent, MusicSchoolStudentRequest, DEFAULT_CLASS_TYPE,
    DEFAULT_MUSIC_LEVEL, DEFAULT_STUDENT_STATUS, PAYMENT_STATUS_UP_TO_DATE,
};

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::statistics;
use crate::domain::validation::{clean, or_default, Validator};
use crate::storage::MusicSchoolRepository;

#[derive(Clone)]
pub struct MusicSchoolService {
    repository: MusicSchoolRepository,
    clock: Arc<dyn Clock>,
}

impl MusicSchoolService {
    pub fn new(repository: MusicSchoolRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self, include_inactive: bool) -> DomainResult<Vec<MusicSchoolStudent>> {
        info!("Listing music school students (include_inactive={})", include_inactive);
        Ok(self.repository.list(include_inactive).await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<MusicSchoolStudent> {
        self.repository.get(id).await?.ok_or_else(|| {
            warn!("Music school student not found: {}", id);
            DomainError::not_found("Aluno", id)
        })
    }

    pub async fn create(&self, request: MusicSchoolStudentRequest) -> DomainResult<MusicSchoolStudent> {
        info!("Enrolling music school student: {}", request.name);
        validate_student(&request)?;

        if self.repository.email_in_use(request.email.trim(), None).await? {
            warn!("Rejected music school student with duplicate email {}", request.email);
            return Err(DomainError::duplicate_email());
        }

        let mut student = MusicSchoolStudent {
            id: 0,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            birth_date: request.birth_date,
            parent_name: clean(request.parent_name),
            parent_phone: clean(request.parent_phone),
            instrument: request.instrument.trim().to_string(),
            level: or_default(request.level, DEFAULT_MUSIC_LEVEL),
            teacher: clean(request.teacher),
            class_type: or_default(request.class_type, DEFAULT_CLASS_TYPE),
            class_schedule: clean(request.class_schedule),
            monthly_fee: request.monthly_fee,
            payment_status: or_default(request.payment_status, PAYMENT_STATUS_UP_TO_DATE),
            last_payment_date: None,
            enrollment_date: self.clock.now(),
            is_active: request.is_active.unwrap_or(true),
            status: or_default(request.status, DEFAULT_STUDENT_STATUS),
            notes: clean(request.notes),
            progress: clean(request.progress),
            total_classes: 0,
            attended_classes: 0,
        };
        student.id = self.repository.create(&student).await?;

        info!("Enrolled music school student {} with ID {}", student.name, student.id);
        Ok(student)
    }

    /// Updates the editable fields; payment date, enrollment date and class
    /// counters are kept
    pub async fn update(
        &self,
        id: i64,
        request: MusicSchoolStudentRequest,
    ) -> DomainResult<MusicSchoolStudent> {
        info!("Updating music school student {}", id);
        let existing = self.get(id).await?;
        validate_student(&request)?;

        if self.repository.email_in_use(request.email.trim(), Some(id)).await? {
            warn!("Rejected update of music school student {}: email already in use", id);
            return Err(DomainError::duplicate_email());
        }

        let student = MusicSchoolStudent {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            birth_date: request.birth_date,
            parent_name: clean(request.parent_name),
            parent_phone: clean(request.parent_phone),
            instrument: request.instrument.trim().to_string(),
            level: or_default(request.level, &existing.level),
            teacher: clean(request.teacher),
            class_type: or_default(request.class_type, &existing.class_type),
            class_schedule: clean(request.class_schedule),
            monthly_fee: request.monthly_fee,
            payment_status: or_default(request.payment_status, &existing.payment_status),
            is_active: request.is_active.unwrap_or(existing.is_active),
            status: or_default(request.status, &existing.status),
            notes: clean(request.notes),
            progress: clean(request.progress),
            ..existing
        };
        self.repository.update(&student).await?;

        info!("Updated music school student {}", id);
        Ok(student)
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        info!("Deactivating music school student {}", id);
        if !self.repository.deactivate(id).await? {
            warn!("Music school student not found: {}", id);
            return Err(DomainError::not_found("Aluno", id));
        }
        Ok(())
    }

    pub async fn register_payment(&self, id: i64) -> DomainResult<MusicSchoolStudent> {
        info!("Registering payment for music school student {}", id);
        if !self.repository.register_payment(id, self.clock.now()).await? {
            warn!("Music school student not found: {}", id);
            return Err(DomainError::not_found("Aluno", id));
        }
        self.get(id).await
    }

    pub async fn register_attendance(&self, id: i64) -> DomainResult<MusicSchoolStudent> {
        info!("Registering attendance for music school student {}", id);
        if !self.repository.register_attendance(id).await? {
            warn!("Music school student not found: {}", id);
            return Err(DomainError::not_found("Aluno", id));
        }
        self.get(id).await
    }

    pub async fn stats(&self) -> DomainResult<MusicSchoolStats> {
        let students = self.repository.list(true).await?;
        Ok(statistics::music_school_stats(&students))
    }
}

fn validate_student(request: &MusicSchoolStudentRequest) -> DomainResult<()> {
    Validator::new()
        .required("name", &request.name)
        .max_len("name", &request.name, 100)
        .required("email", &request.email)
        .email("email", &request.email)
        .max_len("email", &request.email, 100)
        .required("phone", &request.phone)
        .max_len("phone", &request.phone, 20)
        .max_len_opt("parentName", request.parent_name.as_deref(), 100)
        .max_len_opt("parentPhone", request.parent_phone.as_deref(), 20)
        .required("instrument", &request.instrument)
        .max_len("instrument", &request.instrument, 50)
        .max_len_opt("level", request.level.as_deref(), 20)
        .max_len_opt("teacher", request.teacher.as_deref(), 100)
        .max_len_opt("classType", request.class_type.as_deref(), 20)
        .max_len_opt("classSchedule", request.class_schedule.as_deref(), 100)
        .non_negative("monthlyFee", request.monthly_fee)
        .max_len_opt("paymentStatus", request.payment_status.as_deref(), 20)
        .max_len_opt("status", request.status.as_deref(), 20)
        .finish()
}
