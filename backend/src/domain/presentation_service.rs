//! # Child Presentation Service
//!
//! Presentation records and their certificates.
//!
//! Generating a certificate runs in a fixed order: load the record, merge the
//! overrides into a [`CertificateView`], render, write the file, and only then
//! flag the record. Any failure before the last step leaves the record as it
//! was.

use std::sync::Arc;
use tracing::{error, info, warn};

use shared::{
    CertificateResponse, ChildPresentation, ChildPresentationRequest, GenerateCertificateRequest,
    PresentationStats, DEFAULT_BIBLICAL_VERSE, DEFAULT_CHURCH_NAME,
};

use crate::domain::certificate::{self, CertificateStore, CertificateView};
use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::statistics;
use crate::domain::validation::{clean, or_default, Validator};
use crate::storage::PresentationRepository;

/// A stored certificate ready to be sent to the browser
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct PresentationService {
    repository: PresentationRepository,
    certificates: CertificateStore,
    clock: Arc<dyn Clock>,
}

impl PresentationService {
    pub fn new(
        repository: PresentationRepository,
        certificates: CertificateStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, certificates, clock }
    }

    pub async fn list(&self, include_inactive: bool) -> DomainResult<Vec<ChildPresentation>> {
        info!("Listing child presentations (include_inactive={})", include_inactive);
        Ok(self.repository.list(include_inactive).await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<ChildPresentation> {
        self.repository.get(id).await?.ok_or_else(|| {
            warn!("Child presentation not found: {}", id);
            DomainError::not_found("Apresentação", id)
        })
    }

    pub async fn create(&self, request: ChildPresentationRequest) -> DomainResult<ChildPresentation> {
        info!("Registering presentation of {}", request.child_name);
        validate(&request)?;

        let now = self.clock.now();
        let mut presentation = ChildPresentation {
            id: 0,
            child_name: request.child_name.trim().to_string(),
            birth_date: request.birth_date,
            gender: request.gender.trim().to_string(),
            birth_place: clean(request.birth_place),
            father_name: request.father_name.trim().to_string(),
            father_profession: clean(request.father_profession),
            mother_name: request.mother_name.trim().to_string(),
            mother_profession: clean(request.mother_profession),
            presentation_date: request.presentation_date.unwrap_or_else(|| now.date_naive()),
            pastor: request.pastor.trim().to_string(),
            biblical_verse: Some(or_default(request.biblical_verse, DEFAULT_BIBLICAL_VERSE)),
            special_message: clean(request.special_message),
            address: clean(request.address),
            city: clean(request.city),
            phone: clean(request.phone),
            email: clean(request.email),
            church_name: or_default(request.church_name, DEFAULT_CHURCH_NAME),
            church_address: clean(request.church_address),
            certificate_generated: false,
            certificate_path: None,
            created_at: now,
            notes: clean(request.notes),
            is_active: request.is_active.unwrap_or(true),
        };
        presentation.id = self.repository.create(&presentation).await?;

        info!("Registered presentation {} for {}", presentation.id, presentation.child_name);
        Ok(presentation)
    }

    /// Edits every field except the certificate state
    pub async fn update(&self, id: i64, request: ChildPresentationRequest) -> DomainResult<ChildPresentation> {
        info!("Updating child presentation {}", id);
        let existing = self.get(id).await?;
        validate(&request)?;

        let presentation = ChildPresentation {
            child_name: request.child_name.trim().to_string(),
            birth_date: request.birth_date,
            gender: request.gender.trim().to_string(),
            birth_place: clean(request.birth_place),
            father_name: request.father_name.trim().to_string(),
            father_profession: clean(request.father_profession),
            mother_name: request.mother_name.trim().to_string(),
            mother_profession: clean(request.mother_profession),
            presentation_date: request.presentation_date.unwrap_or(existing.presentation_date),
            pastor: request.pastor.trim().to_string(),
            biblical_verse: clean(request.biblical_verse),
            special_message: clean(request.special_message),
            address: clean(request.address),
            city: clean(request.city),
            phone: clean(request.phone),
            email: clean(request.email),
            church_name: or_default(request.church_name, &existing.church_name),
            church_address: clean(request.church_address),
            notes: clean(request.notes),
            is_active: request.is_active.unwrap_or(existing.is_active),
            ..existing
        };
        self.repository.update(&presentation).await?;
        Ok(presentation)
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        info!("Deactivating child presentation {}", id);
        if !self.repository.deactivate(id).await? {
            warn!("Child presentation not found: {}", id);
            return Err(DomainError::not_found("Apresentação", id));
        }
        Ok(())
    }

    /// Summary over active presentations
    pub async fn stats(&self) -> DomainResult<PresentationStats> {
        let presentations = self.repository.list(false).await?;
        Ok(statistics::presentation_stats(&presentations, self.clock.today()))
    }

    /// Renders and stores a new certificate, then points the record at it.
    /// Concurrent calls for the same record are last-write-wins.
    pub async fn generate_certificate(
        &self,
        id: i64,
        overrides: GenerateCertificateRequest,
    ) -> DomainResult<CertificateResponse> {
        info!("Generating certificate for child presentation {}", id);
        let presentation = self.get(id).await?;

        let view = CertificateView::build(&presentation, &overrides).map_err(|err| {
            error!("Cannot render certificate for presentation {}: {}", id, err);
            DomainError::from(err)
        })?;

        let now = self.clock.now();
        let bytes = certificate::render_certificate(&view, now.date_naive());
        let path = self.certificates.save(id, &bytes, now).await.map_err(|err| {
            error!("Failed to store certificate for presentation {}: {}", id, err);
            DomainError::from(err)
        })?;

        if !self.repository.mark_certificate_generated(id, &path).await? {
            return Err(DomainError::not_found("Apresentação", id));
        }

        info!("Certificate for presentation {} stored at {}", id, path);
        Ok(CertificateResponse {
            message: "Certificado gerado com sucesso".to_string(),
            certificate_path: path,
        })
    }

    pub async fn download_certificate(&self, id: i64) -> DomainResult<CertificateDownload> {
        info!("Downloading certificate of child presentation {}", id);
        let presentation = self.get(id).await?;

        let path = match (presentation.certificate_generated, presentation.certificate_path) {
            (true, Some(path)) => path,
            _ => {
                warn!("Certificate of presentation {} was never generated", id);
                return Err(DomainError::InvalidState(
                    "Certificado não foi gerado ainda".to_string(),
                ));
            }
        };

        if !self.certificates.exists(&path).await {
            warn!("Certificate file missing for presentation {}: {}", id, path);
            return Err(DomainError::not_found("Certificado", id));
        }
        let bytes = self.certificates.load(&path).await?;

        Ok(CertificateDownload {
            file_name: download_name(&presentation.child_name),
            bytes,
        })
    }
}

/// `Certificado_<name with underscores>.pdf`
pub fn download_name(child_name: &str) -> String {
    format!("Certificado_{}.pdf", child_name.trim().replace(' ', "_"))
}

fn validate(request: &ChildPresentationRequest) -> DomainResult<()> {
    Validator::new()
        .required("childName", &request.child_name)
        .max_len("childName", &request.child_name, 100)
        .check("birthDate", request.birth_date.is_some(), "campo obrigatório")
        .required("gender", &request.gender)
        .max_len("gender", &request.gender, 20)
        .max_len_opt("birthPlace", request.birth_place.as_deref(), 50)
        .required("fatherName", &request.father_name)
        .max_len("fatherName", &request.father_name, 100)
        .max_len_opt("fatherProfession", request.father_profession.as_deref(), 50)
        .required("motherName", &request.mother_name)
        .max_len("motherName", &request.mother_name, 100)
        .max_len_opt("motherProfession", request.mother_profession.as_deref(), 50)
        .required("pastor", &request.pastor)
        .max_len("pastor", &request.pastor, 100)
        .max_len_opt("biblicalVerse", request.biblical_verse.as_deref(), 200)
        .max_len_opt("specialMessage", request.special_message.as_deref(), 500)
        .max_len_opt("address", request.address.as_deref(), 200)
        .max_len_opt("city", request.city.as_deref(), 50)
        .max_len_opt("phone", request.phone.as_deref(), 20)
        .email_opt("email", request.email.as_deref())
        .max_len_opt("email", request.email.as_deref(), 100)
        .max_len_opt("churchName", request.church_name.as_deref(), 100)
        .max_len_opt("churchAddress", request.church_address.as_deref(), 200)
        .finish()
}
