use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PAYMENT_STATUS_UP_TO_DATE: &str = "Em dia";
pub const DEFAULT_MUSIC_LEVEL: &str = "Iniciante";
pub const DEFAULT_CLASS_TYPE: &str = "Individual";
pub const DEFAULT_STUDENT_STATUS: &str = "Ativo";

pub const PRE_REGISTRATION_PENDING: &str = "Pendente";
pub const PRE_REGISTRATION_CONTACTED: &str = "Contatado";
pub const PRE_REGISTRATION_ENROLLED: &str = "Matriculado";
pub const PRE_REGISTRATION_REJECTED: &str = "Rejeitado";

pub const INSTRUMENTS: [&str; 8] = [
    "Piano",
    "Violino",
    "Flauta",
    "Saxofone",
    "Trompete",
    "Clarinete",
    "Canto",
    "Musicalização Infantil (Bebês)",
];
pub const LEVELS: [&str; 3] = ["Iniciante", "Intermediário", "Avançado"];
pub const CLASS_TYPES: [&str; 2] = ["Individual", "Grupo"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSchoolStudent {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub instrument: String,
    pub level: String,
    pub teacher: Option<String>,
    pub class_type: String,
    pub class_schedule: Option<String>,
    pub monthly_fee: f64,
    pub payment_status: String,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub enrollment_date: DateTime<Utc>,
    pub is_active: bool,
    /// "Ativo", "Trancado" or "Concluído"
    pub status: String,
    pub notes: Option<String>,
    pub progress: Option<String>,
    pub total_classes: i64,
    pub attended_classes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MusicSchoolStudentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub instrument: String,
    pub level: Option<String>,
    pub teacher: Option<String>,
    pub class_type: Option<String>,
    pub class_schedule: Option<String>,
    pub monthly_fee: f64,
    pub payment_status: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub progress: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicSchoolStats {
    pub total_students: u32,
    pub active_students: u32,
    pub inactive_students: u32,
    pub students_by_instrument: BTreeMap<String, u32>,
    pub students_by_level: BTreeMap<String, u32>,
    pub students_by_payment_status: BTreeMap<String, u32>,
    pub total_monthly_revenue: f64,
    pub students_with_pending_payment: u32,
}

/// Public intake form submitted before a student is enrolled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreRegistration {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub instrument: String,
    pub level: String,
    pub preferred_class_type: String,
    pub preferred_schedule: Option<String>,
    pub has_musical_experience: bool,
    pub musical_experience: Option<String>,
    pub questions: Option<String>,
    pub pre_registration_date: DateTime<Utc>,
    pub status: String,
    pub contact_date: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub is_processed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreRegistrationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub parent_name: Option<String>,
    pub parent_email: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub instrument: String,
    pub level: Option<String>,
    pub preferred_class_type: Option<String>,
    pub preferred_schedule: Option<String>,
    pub has_musical_experience: bool,
    pub musical_experience: Option<String>,
    pub questions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreRegistrationCreatedResponse {
    pub message: String,
    pub data: PreRegistration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePreRegistrationRequest {
    pub status: String,
    pub admin_notes: Option<String>,
    pub is_processed: Option<bool>,
}

/// Enrollment terms chosen by staff when converting a pre-registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertPreRegistrationRequest {
    pub teacher: Option<String>,
    pub class_schedule: Option<String>,
    pub monthly_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentsResponse {
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelsResponse {
    pub levels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTypesResponse {
    pub class_types: Vec<String>,
}
