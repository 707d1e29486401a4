//! # Men's Group Service

use std::sync::Arc;
use tracing::{info, warn};

use shared::{MensGroupMember, MensGroupMemberRequest, MensGroupStats};

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::statistics;
use crate::domain::validation::{clean, Validator};
use crate::storage::MensGroupRepository;

#[derive(Clone)]
pub struct MensGroupService {
    repository: MensGroupRepository,
    clock: Arc<dyn Clock>,
}

impl MensGroupService {
    pub fn new(repository: MensGroupRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list(&self, include_inactive: bool) -> DomainResult<Vec<MensGroupMember>> {
        info!("Listing men's group members (include_inactive={})", include_inactive);
        Ok(self.repository.list(include_inactive).await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<MensGroupMember> {
        self.repository.get(id).await?.ok_or_else(|| {
            warn!("Men's group member not found: {}", id);
            DomainError::not_found("Membro", id)
        })
    }

    pub async fn create(&self, request: MensGroupMemberRequest) -> DomainResult<MensGroupMember> {
        info!("Adding men's group member: {}", request.name);
        validate(&request)?;

        if self.repository.email_in_use(request.email.trim(), None).await? {
            warn!("Rejected men's group member with duplicate email {}", request.email);
            return Err(DomainError::duplicate_email());
        }

        let mut member = MensGroupMember {
            id: 0,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            join_date: request.join_date.unwrap_or_else(|| self.clock.today()),
            is_active: request.is_active.unwrap_or(true),
            role: clean(request.role),
            notes: clean(request.notes),
        };
        member.id = self.repository.create(&member).await?;

        info!("Added men's group member {} with ID {}", member.name, member.id);
        Ok(member)
    }

    pub async fn update(&self, id: i64, request: MensGroupMemberRequest) -> DomainResult<MensGroupMember> {
        info!("Updating men's group member {}", id);
        let existing = self.get(id).await?;
        validate(&request)?;

        if self.repository.email_in_use(request.email.trim(), Some(id)).await? {
            warn!("Rejected update of men's group member {}: email already in use", id);
            return Err(DomainError::duplicate_email());
        }

        let member = MensGroupMember {
            id,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone.trim().to_string(),
            join_date: request.join_date.unwrap_or(existing.join_date),
            is_active: request.is_active.unwrap_or(existing.is_active),
            role: clean(request.role),
            notes: clean(request.notes),
        };
        self.repository.update(&member).await?;
        Ok(member)
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        info!("Deactivating men's group member {}", id);
        if !self.repository.deactivate(id).await? {
            warn!("Men's group member not found: {}", id);
            return Err(DomainError::not_found("Membro", id));
        }
        Ok(())
    }

    pub async fn stats(&self) -> DomainResult<MensGroupStats> {
        let members = self.repository.list(true).await?;
        Ok(statistics::mens_group_stats(&members, self.clock.today()))
    }
}

fn validate(request: &MensGroupMemberRequest) -> DomainResult<()> {
    Validator::new()
        .required("name", &request.name)
        .max_len("name", &request.name, 100)
        .required("email", &request.email)
        .email("email", &request.email)
        .max_len("email", &request.email, 100)
        .required("phone", &request.phone)
        .max_len("phone", &request.phone, 20)
        .max_len_opt("role", request.role.as_deref(), 50)
        .finish()
}
