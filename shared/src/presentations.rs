use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIBLICAL_VERSE: &str = "\"Deixai vir a mim os pequeninos\" - Mateus 19:14";
pub const DEFAULT_CHURCH_NAME: &str = "Igreja";
pub const GENDER_MALE: &str = "Masculino";
pub const GENDER_FEMALE: &str = "Feminino";

/// One child dedication ceremony and the state of its certificate.
///
/// `certificate_path` is set exactly when `certificate_generated` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPresentation {
    pub id: i64,
    pub child_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub birth_place: Option<String>,
    pub father_name: String,
    pub father_profession: Option<String>,
    pub mother_name: String,
    pub mother_profession: Option<String>,
    pub presentation_date: NaiveDate,
    pub pastor: String,
    pub biblical_verse: Option<String>,
    pub special_message: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub church_name: String,
    pub church_address: Option<String>,
    pub certificate_generated: bool,
    pub certificate_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub is_active: bool,
}

/// Create and update body. Certificate state is never accepted from clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChildPresentationRequest {
    pub child_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: String,
    pub birth_place: Option<String>,
    pub father_name: String,
    pub father_profession: Option<String>,
    pub mother_name: String,
    pub mother_profession: Option<String>,
    pub presentation_date: Option<NaiveDate>,
    pub pastor: String,
    pub biblical_verse: Option<String>,
    pub special_message: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub church_name: Option<String>,
    pub church_address: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// Per-render replacements; empty strings are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateCertificateRequest {
    pub custom_church_name: Option<String>,
    pub custom_pastor: Option<String>,
    pub custom_biblical_verse: Option<String>,
    pub custom_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub message: String,
    pub certificate_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationGenderStats {
    pub boys: u32,
    pub girls: u32,
    /// Records whose gender is neither of the two recognized values
    pub other: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationAgeStats {
    pub under1_year: u32,
    #[serde(rename = "age1to2")]
    pub age1_to2: u32,
    #[serde(rename = "age3to5")]
    pub age3_to5: u32,
    pub over5_years: u32,
    /// Records without a birth date
    pub unknown: u32,
}

/// Presentations per calendar month, regardless of year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPresentations {
    pub january: u32,
    pub february: u32,
    pub march: u32,
    pub april: u32,
    pub may: u32,
    pub june: u32,
    pub july: u32,
    pub august: u32,
    pub september: u32,
    pub october: u32,
    pub november: u32,
    pub december: u32,
}

impl MonthlyPresentations {
    /// Bucket for a 1-based month number; out of range values are ignored
    pub fn bucket_mut(&mut self, month: u32) -> Option<&mut u32> {
        match month {
            1 => Some(&mut self.january),
            2 => Some(&mut self.february),
            3 => Some(&mut self.march),
            4 => Some(&mut self.april),
            5 => Some(&mut self.may),
            6 => Some(&mut self.june),
            7 => Some(&mut self.july),
            8 => Some(&mut self.august),
            9 => Some(&mut self.september),
            10 => Some(&mut self.october),
            11 => Some(&mut self.november),
            12 => Some(&mut self.december),
            _ => None,
        }
    }

    pub fn total(&self) -> u32 {
        self.january
            + self.february
            + self.march
            + self.april
            + self.may
            + self.june
            + self.july
            + self.august
            + self.september
            + self.october
            + self.november
            + self.december
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationStats {
    pub total_presentations: u32,
    pub presentations_this_year: u32,
    pub presentations_this_month: u32,
    pub gender_stats: PresentationGenderStats,
    pub age_stats: PresentationAgeStats,
    pub monthly_stats: MonthlyPresentations,
    pub certificates_generated: u32,
    pub pending_certificates: u32,
}
