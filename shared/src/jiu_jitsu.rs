use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const BELTS: [&str; 5] = ["Branca", "Azul", "Roxa", "Marrom", "Preta"];
pub const DEFAULT_BELT: &str = "Branca";
pub const DEFAULT_TRAINING_CLASS: &str = "Treino";
pub const DEFAULT_PAYMENT_METHOD: &str = "Dinheiro";
pub const PAYMENT_STATUS_LATE: &str = "Atrasado";
pub const PAYMENT_STATUS_DEFAULTED: &str = "Inadimplente";
pub const MAX_STRIPES: i64 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiuJitsuStudent {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub belt: String,
    pub stripes: i64,
    pub last_promotion_date: Option<NaiveDate>,
    pub monthly_fee: f64,
    pub last_payment_date: Option<NaiveDate>,
    pub payment_status: String,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub health_conditions: Option<String>,
    pub notes: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graduation {
    pub id: i64,
    pub student_id: i64,
    pub from_belt: String,
    pub to_belt: String,
    pub from_stripes: i64,
    pub to_stripes: i64,
    pub graduation_date: NaiveDate,
    pub graduated_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub class_type: String,
    pub is_present: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub student_id: i64,
    pub payment_date: NaiveDate,
    pub amount: f64,
    pub payment_method: String,
    /// Month the payment settles, formatted `YYYY-MM`
    pub reference_month: String,
    pub notes: Option<String>,
}

/// Student plus their graduation history and most recent activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiuJitsuStudentDetail {
    #[serde(flatten)]
    pub student: JiuJitsuStudent,
    pub age: Option<u32>,
    pub graduations: Vec<Graduation>,
    pub recent_attendances: Vec<Attendance>,
    pub recent_payments: Vec<Payment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JiuJitsuStudentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub belt: Option<String>,
    pub stripes: i64,
    pub last_promotion_date: Option<NaiveDate>,
    pub monthly_fee: f64,
    pub last_payment_date: Option<NaiveDate>,
    pub payment_status: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub health_conditions: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGraduationRequest {
    pub to_belt: String,
    pub to_stripes: i64,
    /// Defaults to today
    pub graduation_date: Option<NaiveDate>,
    pub graduated_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateAttendanceRequest {
    pub date: Option<NaiveDate>,
    pub class_type: Option<String>,
    #[serde(default = "crate::default_true")]
    pub is_present: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkAttendanceRequest {
    pub date: Option<NaiveDate>,
    pub class_type: Option<String>,
    pub students: Vec<StudentAttendance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentAttendance {
    pub student_id: i64,
    pub is_present: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePaymentRequest {
    pub payment_date: Option<NaiveDate>,
    pub amount: f64,
    pub payment_method: Option<String>,
    /// Defaults to the month of the payment date
    pub reference_month: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeltDistribution {
    pub branca: u32,
    pub azul: u32,
    pub roxa: u32,
    pub marrom: u32,
    pub preta: u32,
    pub other: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiuJitsuPaymentStats {
    pub em_dia: u32,
    pub atrasado: u32,
    pub inadimplente: u32,
    pub total_received: f64,
    pub total_pending: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiuJitsuAgeGroups {
    pub kids: u32,
    pub teens: u32,
    pub adults: u32,
    pub seniors: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRate {
    pub overall_rate: f64,
    pub last_week_rate: f64,
    pub last_month_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiuJitsuStats {
    pub total_students: u32,
    pub active_students: u32,
    pub inactive_students: u32,
    pub belt_distribution: BeltDistribution,
    pub payment_stats: JiuJitsuPaymentStats,
    pub age_groups: JiuJitsuAgeGroups,
    pub total_monthly_revenue: f64,
    pub total_graduations_this_year: u32,
    pub attendance_rate: AttendanceRate,
}
