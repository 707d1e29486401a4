use chrono::NaiveDate;

use shared::{ChildPresentation, GenerateCertificateRequest, GENDER_MALE};

use super::pdf::Rgb;
use super::RenderError;

/// Which wording and color scheme the certificate uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentee {
    Boy,
    Girl,
}

impl Presentee {
    /// Anything other than "Masculino" is rendered as a girl
    pub fn from_gender(gender: &str) -> Self {
        if gender == GENDER_MALE {
            Presentee::Boy
        } else {
            Presentee::Girl
        }
    }

    pub fn primary_color(self) -> Rgb {
        match self {
            Presentee::Boy => Rgb(0, 0, 255),
            Presentee::Girl => Rgb(255, 20, 147),
        }
    }

    pub fn article(self) -> &'static str {
        match self {
            Presentee::Boy => "o menino",
            Presentee::Girl => "a menina",
        }
    }
}

/// Everything printed on one certificate, already merged with overrides.
///
/// Built fresh for each render so the stored record is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateView {
    pub presentee: Presentee,
    pub child_name: String,
    pub birth_date: NaiveDate,
    pub father_name: String,
    pub mother_name: String,
    pub presentation_date: NaiveDate,
    pub church_name: String,
    pub church_address: Option<String>,
    pub pastor: String,
    pub biblical_verse: Option<String>,
    pub special_message: Option<String>,
}

impl CertificateView {
    /// Merges `overrides` over `record`. Each override applies only when it
    /// is not the empty string; whitespace is kept as given.
    pub fn build(
        record: &ChildPresentation,
        overrides: &GenerateCertificateRequest,
    ) -> Result<Self, RenderError> {
        let child_name = record.child_name.trim();
        if child_name.is_empty() {
            return Err(RenderError::MissingField("childName"));
        }
        let birth_date = record
            .birth_date
            .ok_or(RenderError::MissingField("birthDate"))?;

        Ok(Self {
            presentee: Presentee::from_gender(&record.gender),
            child_name: child_name.to_string(),
            birth_date,
            father_name: record.father_name.clone(),
            mother_name: record.mother_name.clone(),
            presentation_date: record.presentation_date,
            church_name: pick(&overrides.custom_church_name, Some(&record.church_name))
                .unwrap_or_default(),
            church_address: non_empty(record.church_address.as_deref()),
            pastor: pick(&overrides.custom_pastor, Some(&record.pastor)).unwrap_or_default(),
            biblical_verse: pick(
                &overrides.custom_biblical_verse,
                record.biblical_verse.as_ref(),
            ),
            special_message: pick(&overrides.custom_message, record.special_message.as_ref()),
        })
    }
}

fn pick(over: &Option<String>, stored: Option<&String>) -> Option<String> {
    over.as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| non_empty(stored.map(String::as_str)))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
