//! # Member Service
//!
//! Church members, their family rows and their photos.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use shared::{
    FamilyMember, FamilyMemberRequest, Member, MemberDetail, MemberRequest, MemberStats,
    PhotoUploadResponse, DEFAULT_BAPTISM_STATUS, DEFAULT_MARITAL_STATUS, DEFAULT_MEMBERSHIP_TYPE,
    DEFAULT_MEMBER_GENDER,
};

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::statistics;
use crate::domain::validation::{clean, or_default, Validator};
use crate::storage::{FileStore, MemberRepository};

pub const MEMBER_PHOTOS_DIR: &str = "uploads/members";
const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Clone)]
pub struct MemberService {
    repository: MemberRepository,
    files: FileStore,
    clock: Arc<dyn Clock>,
}

impl MemberService {
    pub fn new(repository: MemberRepository, files: FileStore, clock: Arc<dyn Clock>) -> Self {
        Self { repository, files, clock }
    }

    pub async fn list(&self, include_inactive: bool) -> DomainResult<Vec<Member>> {
        info!("Listing members (include_inactive={})", include_inactive);
        let members = self.repository.list(include_inactive).await?;
        info!("Found {} members", members.len());
        Ok(members)
    }

    pub async fn get(&self, id: i64) -> DomainResult<MemberDetail> {
        let member = self.load(id).await?;
        let family_members = self.repository.list_family(id).await?;
        Ok(MemberDetail { member, family_members })
    }

    pub async fn create(&self, request: MemberRequest) -> DomainResult<MemberDetail> {
        info!("Creating member: {}", request.full_name);
        validate_member(&request)?;

        let email = request.email.trim().to_string();
        if self.repository.email_in_use(&email, None).await? {
            warn!("Rejected member with duplicate email {}", email);
            return Err(DomainError::duplicate_email());
        }

        let mut member = member_from_request(request, self.clock.today(), true);
        member.id = self.repository.create(&member).await?;

        info!("Created member {} with ID {}", member.full_name, member.id);
        Ok(MemberDetail { member, family_members: Vec::new() })
    }

    /// Full-field update. The photo is kept; it only changes through upload.
    pub async fn update(&self, id: i64, request: MemberRequest) -> DomainResult<Member> {
        info!("Updating member {}", id);
        let existing = self.load(id).await?;
        validate_member(&request)?;

        if self.repository.email_in_use(request.email.trim(), Some(id)).await? {
            warn!("Rejected update of member {}: email already in use", id);
            return Err(DomainError::duplicate_email());
        }

        let is_active = request.is_active.unwrap_or(existing.is_active);
        let membership_date = request.membership_date.unwrap_or(existing.membership_date);
        let mut member = member_from_request(request, membership_date, is_active);
        member.id = id;
        member.photo_path = existing.photo_path;

        self.repository.update(&member).await?;
        info!("Updated member {}", id);
        Ok(member)
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        info!("Deactivating member {}", id);
        if !self.repository.deactivate(id).await? {
            warn!("Member not found: {}", id);
            return Err(DomainError::not_found("Membro", id));
        }
        Ok(())
    }

    /// Stores the photo under `uploads/members/` and records its public path
    pub async fn upload_photo(
        &self,
        id: i64,
        file_name: &str,
        bytes: &[u8],
    ) -> DomainResult<PhotoUploadResponse> {
        info!("Uploading photo for member {} ({} bytes)", id, bytes.len());
        self.load(id).await?;

        if bytes.is_empty() {
            return Err(DomainError::validation("photo", "Arquivo de foto não fornecido"));
        }
        let extension = photo_extension(file_name).ok_or_else(|| {
            DomainError::validation("photo", "Tipo de arquivo não suportado. Use JPG, PNG ou GIF")
        })?;

        let relative = format!(
            "{}/{}_{}.{}",
            MEMBER_PHOTOS_DIR,
            id,
            uuid::Uuid::new_v4(),
            extension
        );
        self.files.write_atomic(&relative, bytes).await?;

        let photo_path = format!("/{}", relative);
        self.repository.set_photo_path(id, &photo_path).await?;

        info!("Stored photo for member {} at {}", id, photo_path);
        Ok(PhotoUploadResponse { photo_path })
    }

    pub async fn stats(&self) -> DomainResult<MemberStats> {
        let members = self.repository.list(true).await?;
        let family_sizes = self.repository.family_sizes().await?;
        Ok(statistics::member_stats(&members, &family_sizes, self.clock.today()))
    }

    pub async fn add_family_member(
        &self,
        member_id: i64,
        request: FamilyMemberRequest,
    ) -> DomainResult<FamilyMember> {
        info!("Adding family member {} to member {}", request.name, member_id);
        self.load(member_id).await?;
        validate_family_member(&request)?;

        let mut family = family_from_request(member_id, request);
        family.id = self.repository.add_family_member(&family).await?;
        Ok(family)
    }

    pub async fn update_family_member(
        &self,
        member_id: i64,
        family_id: i64,
        request: FamilyMemberRequest,
    ) -> DomainResult<FamilyMember> {
        info!("Updating family member {} of member {}", family_id, member_id);
        if self.repository.get_family_member(member_id, family_id).await?.is_none() {
            warn!("Family member {} not found for member {}", family_id, member_id);
            return Err(DomainError::not_found("Familiar", family_id));
        }
        validate_family_member(&request)?;

        let mut family = family_from_request(member_id, request);
        family.id = family_id;
        self.repository.update_family_member(&family).await?;
        Ok(family)
    }

    pub async fn remove_family_member(&self, member_id: i64, family_id: i64) -> DomainResult<()> {
        info!("Removing family member {} of member {}", family_id, member_id);
        if !self.repository.remove_family_member(member_id, family_id).await? {
            warn!("Family member {} not found for member {}", family_id, member_id);
            return Err(DomainError::not_found("Familiar", family_id));
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> DomainResult<Member> {
        self.repository.get(id).await?.ok_or_else(|| {
            warn!("Member not found: {}", id);
            DomainError::not_found("Membro", id)
        })
    }
}

fn validate_member(request: &MemberRequest) -> DomainResult<()> {
    Validator::new()
        .required("fullName", &request.full_name)
        .max_len("fullName", &request.full_name, 100)
        .required("email", &request.email)
        .email("email", &request.email)
        .max_len("email", &request.email, 100)
        .required("phone", &request.phone)
        .max_len("phone", &request.phone, 20)
        .max_len_opt("cpf", request.cpf.as_deref(), 14)
        .max_len_opt("rg", request.rg.as_deref(), 20)
        .max_len_opt("gender", request.gender.as_deref(), 20)
        .max_len_opt("maritalStatus", request.marital_status.as_deref(), 20)
        .max_len_opt("profession", request.profession.as_deref(), 50)
        .max_len_opt("education", request.education.as_deref(), 50)
        .max_len_opt("alternativePhone", request.alternative_phone.as_deref(), 20)
        .max_len_opt("address", request.address.as_deref(), 200)
        .max_len_opt("neighborhood", request.neighborhood.as_deref(), 50)
        .max_len_opt("city", request.city.as_deref(), 50)
        .max_len_opt("state", request.state.as_deref(), 2)
        .max_len_opt("zipCode", request.zip_code.as_deref(), 10)
        .max_len_opt("membershipType", request.membership_type.as_deref(), 50)
        .max_len_opt("baptismStatus", request.baptism_status.as_deref(), 50)
        .max_len_opt("baptismLocation", request.baptism_location.as_deref(), 100)
        .max_len_opt("previousChurch", request.previous_church.as_deref(), 100)
        .max_len_opt("ministry", request.ministry.as_deref(), 50)
        .max_len_opt("cellGroup", request.cell_group.as_deref(), 50)
        .max_len_opt("leadershipPosition", request.leadership_position.as_deref(), 50)
        .max_len_opt("emergencyContactName", request.emergency_contact_name.as_deref(), 100)
        .max_len_opt("emergencyContactPhone", request.emergency_contact_phone.as_deref(), 20)
        .max_len_opt(
            "emergencyContactRelationship",
            request.emergency_contact_relationship.as_deref(),
            50,
        )
        .finish()
}

fn validate_family_member(request: &FamilyMemberRequest) -> DomainResult<()> {
    Validator::new()
        .required("name", &request.name)
        .max_len("name", &request.name, 100)
        .required("relationship", &request.relationship)
        .max_len("relationship", &request.relationship, 50)
        .max_len_opt("phone", request.phone.as_deref(), 20)
        .email_opt("email", request.email.as_deref())
        .max_len_opt("email", request.email.as_deref(), 100)
        .finish()
}

fn member_from_request(
    request: MemberRequest,
    membership_date: chrono::NaiveDate,
    is_active: bool,
) -> Member {
    Member {
        id: 0,
        full_name: request.full_name.trim().to_string(),
        cpf: clean(request.cpf),
        rg: clean(request.rg),
        birth_date: request.birth_date,
        gender: or_default(request.gender, DEFAULT_MEMBER_GENDER),
        marital_status: or_default(request.marital_status, DEFAULT_MARITAL_STATUS),
        profession: clean(request.profession),
        education: clean(request.education),
        photo_path: None,
        email: request.email.trim().to_string(),
        phone: request.phone.trim().to_string(),
        alternative_phone: clean(request.alternative_phone),
        address: clean(request.address),
        neighborhood: clean(request.neighborhood),
        city: clean(request.city),
        state: clean(request.state),
        zip_code: clean(request.zip_code),
        membership_date: request.membership_date.unwrap_or(membership_date),
        membership_type: or_default(request.membership_type, DEFAULT_MEMBERSHIP_TYPE),
        baptism_status: or_default(request.baptism_status, DEFAULT_BAPTISM_STATUS),
        baptism_date: request.baptism_date,
        baptism_location: clean(request.baptism_location),
        previous_church: clean(request.previous_church),
        ministry: clean(request.ministry),
        cell_group: clean(request.cell_group),
        leadership_position: clean(request.leadership_position),
        emergency_contact_name: clean(request.emergency_contact_name),
        emergency_contact_phone: clean(request.emergency_contact_phone),
        emergency_contact_relationship: clean(request.emergency_contact_relationship),
        notes: clean(request.notes),
        is_active,
    }
}

fn family_from_request(member_id: i64, request: FamilyMemberRequest) -> FamilyMember {
    FamilyMember {
        id: 0,
        member_id,
        name: request.name.trim().to_string(),
        relationship: request.relationship.trim().to_string(),
        birth_date: request.birth_date,
        phone: clean(request.phone),
        email: clean(request.email),
        is_church_member: request.is_church_member,
        church_member_id: request.church_member_id,
        notes: clean(request.notes),
    }
}

/// Lower-cased extension when it is an accepted image type
fn photo_extension(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    PHOTO_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn setup_test() -> (MemberService, TempDir) {
        let db = DbConnection::in_memory().await.unwrap();
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
        let service = MemberService::new(
            MemberRepository::new(db),
            FileStore::new(dir.path()),
            clock,
        );
        (service, dir)
    }

    fn request(name: &str, email: &str) -> MemberRequest {
        MemberRequest {
            full_name: name.to_string(),
            email: email.to_string(),
            phone: "11988887777".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_member_applies_defaults() {
        let (service, _dir) = setup_test().await;

        let detail = service.create(request("Maria Silva", "maria@example.com")).await.unwrap();

        assert!(detail.member.id > 0);
        assert_eq!(detail.member.gender, DEFAULT_MEMBER_GENDER);
        assert_eq!(detail.member.membership_type, DEFAULT_MEMBERSHIP_TYPE);
        assert_eq!(
            detail.member.membership_date,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
        assert!(detail.member.is_active);
        assert!(detail.family_members.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict_and_nothing_is_inserted() {
        let (service, _dir) = setup_test().await;
        service.create(request("Maria", "maria@example.com")).await.unwrap();

        let err = service.create(request("Outra Maria", "MARIA@example.com")).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(service.list(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_reports_every_field() {
        let (service, _dir) = setup_test().await;

        let err = service.create(MemberRequest::default()).await.unwrap_err();

        match err {
            DomainError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"fullName"));
                assert!(fields.contains(&"email"));
                assert!(fields.contains(&"phone"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let (service, _dir) = setup_test().await;
        let id = service.create(request("João", "joao@example.com")).await.unwrap().member.id;

        service.delete(id).await.unwrap();

        assert!(service.list(false).await.unwrap().is_empty());
        assert!(!service.get(id).await.unwrap().member.is_active);
    }

    #[tokio::test]
    async fn test_family_members_are_scoped_to_their_member() {
        let (service, _dir) = setup_test().await;
        let a = service.create(request("A", "a@example.com")).await.unwrap().member.id;
        let b = service.create(request("B", "b@example.com")).await.unwrap().member.id;

        let family = service
            .add_family_member(
                a,
                FamilyMemberRequest {
                    name: "Filho".to_string(),
                    relationship: "Filho(a)".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.remove_family_member(b, family.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(service.get(a).await.unwrap().family_members.len(), 1);

        service.remove_family_member(a, family.id).await.unwrap();
        assert!(service.get(a).await.unwrap().family_members.is_empty());
    }

    #[tokio::test]
    async fn test_photo_upload_stores_file_and_path() {
        let (service, dir) = setup_test().await;
        let id = service.create(request("Ana", "ana@example.com")).await.unwrap().member.id;

        let response = service.upload_photo(id, "Foto.JPG", b"image-bytes").await.unwrap();

        assert!(response.photo_path.starts_with("/uploads/members/"));
        assert!(response.photo_path.ends_with(".jpg"));
        let on_disk = dir.path().join(response.photo_path.trim_start_matches('/'));
        assert_eq!(std::fs::read(on_disk).unwrap(), b"image-bytes");
        assert_eq!(
            service.get(id).await.unwrap().member.photo_path,
            Some(response.photo_path)
        );
    }

    #[tokio::test]
    async fn test_photo_upload_rejects_other_types() {
        let (service, _dir) = setup_test().await;
        let id = service.create(request("Ana", "ana@example.com")).await.unwrap().member.id;

        let err = service.upload_photo(id, "document.pdf", b"%PDF").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service.upload_photo(id, "photo.png", b"").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_photo_and_missing_member_is_not_found() {
        let (service, _dir) = setup_test().await;
        let id = service.create(request("Ana", "ana@example.com")).await.unwrap().member.id;
        let photo = service.upload_photo(id, "a.png", b"png").await.unwrap().photo_path;

        let updated = service.update(id, request("Ana Paula", "ana@example.com")).await.unwrap();
        assert_eq!(updated.full_name, "Ana Paula");
        assert_eq!(updated.photo_path, Some(photo));

        let err = service.update(999, request("X", "x@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
