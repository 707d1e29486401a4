//! # Jiu-Jitsu Service
//!
//! Academy students plus the three histories they own: belt graduations,
//! class attendance and monthly payments. Child rows are always addressed
//! through their student, so one student's id can never reach another
//! student's rows.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use shared::{
    Attendance, BulkAttendanceRequest, CreateAttendanceRequest, CreateGraduationRequest,
    CreatePaymentRequest, Graduation, JiuJitsuStats, JiuJitsuStudent, JiuJitsuStudentDetail,
    JiuJitsuStudentRequest, Payment, DEFAULT_BELT, DEFAULT_PAYMENT_METHOD, DEFAULT_TRAINING_CLASS,
    MAX_STRIPES, PAYMENT_STATUS_UP_TO_DATE,
};

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::statistics;
use crate::domain::validation::{clean, or_default, Validator};
use crate::storage::JiuJitsuRepository;

/// Attendances and payments shown on the student detail page
const RECENT_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct JiuJitsuService {
    repository: JiuJitsuRepository,
    clock: Arc<dyn Clock>,
}

impl JiuJitsuService {
    pub fn new(repository: JiuJitsuRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self, include_inactive: bool) -> DomainResult<Vec<JiuJitsuStudent>> {
        info!("Listing jiu-jitsu students (include_inactive={})", include_inactive);
        Ok(self.repository.list(include_inactive).await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<JiuJitsuStudentDetail> {
        let student = self.load(id).await?;
        let age = student
            .birth_date
            .and_then(|birth| statistics::age_in_years(birth, self.clock.today()));

        Ok(JiuJitsuStudentDetail {
            age,
            graduations: self.repository.list_graduations(id).await?,
            recent_attendances: self.repository.recent_attendances(id, RECENT_LIMIT).await?,
            recent_payments: self.repository.recent_payments(id, RECENT_LIMIT).await?,
            student,
        })
    }

    pub async fn create(&self, request: JiuJitsuStudentRequest) -> DomainResult<JiuJitsuStudent> {
        info!("Enrolling jiu-jitsu student: {}", request.name);
        validate_student(&request)?;

        if self.repository.email_in_use(request.email.trim(), None).await? {
            warn!("Rejected jiu-jitsu student with duplicate email {}", request.email);
            return Err(DomainError::duplicate_email());
        }

        let mut student = JiuJitsuStudent {
            id: 0,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            cpf: clean(request.cpf),
            birth_date: request.birth_date,
            address: clean(request.address),
            belt: or_default(request.belt, DEFAULT_BELT),
            stripes: request.stripes,
            last_promotion_date: request.last_promotion_date,
            monthly_fee: request.monthly_fee,
            last_payment_date: request.last_payment_date,
            payment_status: or_default(request.payment_status, PAYMENT_STATUS_UP_TO_DATE),
            emergency_contact: clean(request.emergency_contact),
            emergency_phone: clean(request.emergency_phone),
            health_conditions: clean(request.health_conditions),
            notes: clean(request.notes),
            enrollment_date: self.clock.now(),
            is_active: request.is_active.unwrap_or(true),
        };
        student.id = self.repository.create(&student).await?;

        info!("Enrolled jiu-jitsu student {} with ID {}", student.name, student.id);
        Ok(student)
    }

    pub async fn update(&self, id: i64, request: JiuJitsuStudentRequest) -> DomainResult<JiuJitsuStudent> {
        info!("Updating jiu-jitsu student {}", id);
        let existing = self.load(id).await?;
        validate_student(&request)?;

        if self.repository.email_in_use(request.email.trim(), Some(id)).await? {
            warn!("Rejected update of jiu-jitsu student {}: email already in use", id);
            return Err(DomainError::duplicate_email());
        }

        let student = JiuJitsuStudent {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            cpf: clean(request.cpf),
            birth_date: request.birth_date,
            address: clean(request.address),
            belt: or_default(request.belt, &existing.belt),
            stripes: request.stripes,
            last_promotion_date: request.last_promotion_date.or(existing.last_promotion_date),
            monthly_fee: request.monthly_fee,
            last_payment_date: request.last_payment_date.or(existing.last_payment_date),
            payment_status: or_default(request.payment_status, &existing.payment_status),
            emergency_contact: clean(request.emergency_contact),
            emergency_phone: clean(request.emergency_phone),
            health_conditions: clean(request.health_conditions),
            notes: clean(request.notes),
            is_active: request.is_active.unwrap_or(existing.is_active),
            ..existing
        };
        self.repository.update(&student).await?;

        info!("Updated jiu-jitsu student {}", id);
        Ok(student)
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        info!("Deactivating jiu-jitsu student {}", id);
        if !self.repository.deactivate(id).await? {
            warn!("Jiu-jitsu student not found: {}", id);
            return Err(DomainError::not_found("Aluno", id));
        }
        Ok(())
    }

    /// Promotes the student, recording the belt and stripes they had before
    pub async fn add_graduation(
        &self,
        student_id: i64,
        request: CreateGraduationRequest,
    ) -> DomainResult<Graduation> {
        info!("Graduating jiu-jitsu student {} to {}", student_id, request.to_belt);
        let student = self.load(student_id).await?;

        Validator::new()
            .required("toBelt", &request.to_belt)
            .max_len("toBelt", &request.to_belt, 20)
            .check(
                "toStripes",
                (0..=MAX_STRIPES).contains(&request.to_stripes),
                "número de graus inválido",
            )
            .max_len_opt("graduatedBy", request.graduated_by.as_deref(), 100)
            .finish()?;

        let mut graduation = Graduation {
            id: 0,
            student_id,
            from_belt: student.belt,
            to_belt: request.to_belt.trim().to_string(),
            from_stripes: student.stripes,
            to_stripes: request.to_stripes,
            graduation_date: request.graduation_date.unwrap_or_else(|| self.clock.today()),
            graduated_by: clean(request.graduated_by),
            notes: clean(request.notes),
        };
        graduation.id = self.repository.add_graduation(&graduation).await?;

        info!(
            "Student {} graduated from {} to {}",
            student_id, graduation.from_belt, graduation.to_belt
        );
        Ok(graduation)
    }

    pub async fn remove_graduation(&self, student_id: i64, graduation_id: i64) -> DomainResult<()> {
        info!("Removing graduation {} of student {}", graduation_id, student_id);
        if !self.repository.remove_graduation(student_id, graduation_id).await? {
            warn!("Graduation {} not found for student {}", graduation_id, student_id);
            return Err(DomainError::not_found("Graduação", graduation_id));
        }
        Ok(())
    }

    pub async fn add_attendance(
        &self,
        student_id: i64,
        request: CreateAttendanceRequest,
    ) -> DomainResult<Attendance> {
        info!("Recording attendance for jiu-jitsu student {}", student_id);
        self.load(student_id).await?;

        let mut attendance = Attendance {
            id: 0,
            student_id,
            date: request.date.unwrap_or_else(|| self.clock.today()),
            class_type: or_default(request.class_type, DEFAULT_TRAINING_CLASS),
            is_present: request.is_present,
            notes: clean(request.notes),
        };
        let ids = self.repository.add_attendances(std::slice::from_ref(&attendance)).await?;
        attendance.id = ids.first().copied().unwrap_or_default();
        Ok(attendance)
    }

    /// Records one class for many students. Every student must exist before
    /// anything is written.
    pub async fn add_bulk_attendance(&self, request: BulkAttendanceRequest) -> DomainResult<Vec<Attendance>> {
        info!("Recording bulk attendance for {} students", request.students.len());
        Validator::new()
            .check("students", !request.students.is_empty(), "informe ao menos um aluno")
            .finish()?;

        let ids: Vec<i64> = request.students.iter().map(|s| s.student_id).collect();
        if let Some(missing) = self.repository.missing_students(&ids).await?.first() {
            warn!("Bulk attendance references unknown student {}", missing);
            return Err(DomainError::not_found("Aluno", *missing));
        }

        let date = request.date.unwrap_or_else(|| self.clock.today());
        let class_type = or_default(request.class_type, DEFAULT_TRAINING_CLASS);
        let mut attendances: Vec<Attendance> = request
            .students
            .into_iter()
            .map(|entry| Attendance {
                id: 0,
                student_id: entry.student_id,
                date,
                class_type: class_type.clone(),
                is_present: entry.is_present,
                notes: clean(entry.notes),
            })
            .collect();

        let ids = self.repository.add_attendances(&attendances).await?;
        for (attendance, id) in attendances.iter_mut().zip(ids) {
            attendance.id = id;
        }

        info!("Recorded {} attendances for {}", attendances.len(), date);
        Ok(attendances)
    }

    pub async fn remove_attendance(&self, student_id: i64, attendance_id: i64) -> DomainResult<()> {
        info!("Removing attendance {} of student {}", attendance_id, student_id);
        if !self.repository.remove_attendance(student_id, attendance_id).await? {
            warn!("Attendance {} not found for student {}", attendance_id, student_id);
            return Err(DomainError::not_found("Presença", attendance_id));
        }
        Ok(())
    }

    /// Records a payment and marks the student up to date
    pub async fn add_payment(&self, student_id: i64, request: CreatePaymentRequest) -> DomainResult<Payment> {
        info!("Recording payment of {} for student {}", request.amount, student_id);
        self.load(student_id).await?;

        let reference_month = clean(request.reference_month);
        Validator::new()
            .check(
                "amount",
                request.amount.is_finite() && request.amount > 0.0,
                "o valor deve ser maior que zero",
            )
            .check(
                "referenceMonth",
                reference_month.as_deref().map_or(true, is_reference_month),
                "use o formato AAAA-MM",
            )
            .max_len_opt("paymentMethod", request.payment_method.as_deref(), 30)
            .finish()?;

        let payment_date = request.payment_date.unwrap_or_else(|| self.clock.today());
        let mut payment = Payment {
            id: 0,
            student_id,
            payment_date,
            amount: request.amount,
            payment_method: or_default(request.payment_method, DEFAULT_PAYMENT_METHOD),
            reference_month: reference_month
                .unwrap_or_else(|| statistics::reference_month(payment_date)),
            notes: clean(request.notes),
        };
        payment.id = self.repository.add_payment(&payment).await?;
        Ok(payment)
    }

    pub async fn remove_payment(&self, student_id: i64, payment_id: i64) -> DomainResult<()> {
        info!("Removing payment {} of student {}", payment_id, student_id);
        if !self.repository.remove_payment(student_id, payment_id).await? {
            warn!("Payment {} not found for student {}", payment_id, student_id);
            return Err(DomainError::not_found("Pagamento", payment_id));
        }
        Ok(())
    }

    pub async fn stats(&self) -> DomainResult<JiuJitsuStats> {
        let students = self.repository.list(true).await?;
        let graduations = self.repository.all_graduations().await?;
        let attendances = self.repository.all_attendances().await?;
        let payments = self.repository.all_payments().await?;
        Ok(statistics::jiu_jitsu_stats(
            &students,
            &graduations,
            &attendances,
            &payments,
            self.clock.today(),
        ))
    }

    async fn load(&self, id: i64) -> DomainResult<JiuJitsuStudent> {
        self.repository.get(id).await?.ok_or_else(|| {
            warn!("Jiu-jitsu student not found: {}", id);
            DomainError::not_found("Aluno", id)
        })
    }
}

fn validate_student(request: &JiuJitsuStudentRequest) -> DomainResult<()> {
    Validator::new()
        .required("name", &request.name)
        .max_len("name", &request.name, 100)
        .required("email", &request.email)
        .email("email", &request.email)
        .max_len("email", &request.email, 100)
        .required("phone", &request.phone)
        .max_len("phone", &request.phone, 20)
        .max_len_opt("cpf", request.cpf.as_deref(), 14)
        .max_len_opt("address", request.address.as_deref(), 200)
        .max_len_opt("belt", request.belt.as_deref(), 20)
        .check(
            "stripes",
            (0..=MAX_STRIPES).contains(&request.stripes),
            "número de graus inválido",
        )
        .non_negative("monthlyFee", request.monthly_fee)
        .max_len_opt("paymentStatus", request.payment_status.as_deref(), 20)
        .max_len_opt("emergencyContact", request.emergency_contact.as_deref(), 100)
        .max_len_opt("emergencyPhone", request.emergency_phone.as_deref(), 20)
        .finish()
}

fn is_reference_month(value: &str) -> bool {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok() && value.len() == 7
}
