//! # User Service
//!
//! Back office accounts. Only admins reach these operations; the REST layer
//! enforces that before calling in.

use std::sync::Arc;
use tracing::{info, warn};

use shared::{CreateUserRequest, UpdateUserRequest, User, ROLE_ADMIN, ROLE_USER};

use crate::domain::auth::hash_password;
use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::validation::{clean, Validator};
use crate::storage::UserRepository;

const ROLES: [&str; 2] = [ROLE_ADMIN, ROLE_USER];
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(users: UserRepository, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    pub async fn list(&self) -> DomainResult<Vec<User>> {
        info!("Listing users");
        Ok(self.users.list().await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<User> {
        self.users
            .get(id)
            .await?
            .map(|stored| stored.user)
            .ok_or_else(|| {
                warn!("User not found: {}", id);
                DomainError::not_found("Usuário", id)
            })
    }

    pub async fn create(&self, request: CreateUserRequest) -> DomainResult<User> {
        info!("Creating user {} with role {}", request.email, request.role);
        Validator::new()
            .required("name", &request.name)
            .max_len("name", &request.name, 100)
            .required("email", &request.email)
            .email("email", &request.email)
            .max_len("email", &request.email, 100)
            .check(
                "password",
                request.password.chars().count() >= MIN_PASSWORD_LEN,
                "a senha deve ter ao menos 6 caracteres",
            )
            .one_of("role", &request.role, &ROLES)
            .finish()?;

        if self.users.email_in_use(request.email.trim(), None).await? {
            warn!("Rejected user with duplicate email {}", request.email);
            return Err(DomainError::duplicate_email());
        }

        let mut user = User {
            id: 0,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            role: request.role,
            created_at: self.clock.now(),
            is_active: true,
        };
        user.id = self.users.create(&user, &hash_password(&request.password)?).await?;

        info!("Created user {} with ID {}", user.email, user.id);
        Ok(user)
    }

    /// The password changes only when a non-empty one is supplied
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> DomainResult<User> {
        info!("Updating user {}", id);
        let existing = self.get(id).await?;
        let password = clean(request.password);

        Validator::new()
            .required("name", &request.name)
            .max_len("name", &request.name, 100)
            .required("email", &request.email)
            .email("email", &request.email)
            .max_len("email", &request.email, 100)
            .check(
                "password",
                password
                    .as_deref()
                    .map_or(true, |p| p.chars().count() >= MIN_PASSWORD_LEN),
                "a senha deve ter ao menos 6 caracteres",
            )
            .one_of("role", &request.role, &ROLES)
            .finish()?;

        if self.users.email_in_use(request.email.trim(), Some(id)).await? {
            warn!("Rejected update of user {}: email already in use", id);
            return Err(DomainError::duplicate_email());
        }
        let loses_admin = existing.role == ROLE_ADMIN
            && existing.is_active
            && (request.role != ROLE_ADMIN || !request.is_active);
        if loses_admin {
            self.ensure_another_admin(id).await?;
        }

        let user = User {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            role: request.role,
            is_active: request.is_active,
            ..existing
        };
        self.users.update(&user).await?;
        if let Some(password) = password {
            self.users.update_password(id, &hash_password(&password)?).await?;
            info!("Password changed for user {}", id);
        }
        Ok(user)
    }

    /// Soft delete. The last active admin cannot be removed.
    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        info!("Deactivating user {}", id);
        let existing = self.get(id).await?;
        if existing.role == ROLE_ADMIN && existing.is_active {
            self.ensure_another_admin(id).await?;
        }
        self.users.deactivate(id).await?;
        Ok(())
    }

    async fn ensure_another_admin(&self, id: i64) -> DomainResult<()> {
        if self.users.count_active_admins(Some(id)).await? == 0 {
            warn!("Refusing to remove the last active admin ({})", id);
            return Err(DomainError::InvalidState(
                "É necessário manter ao menos um administrador ativo".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::verify_password;
    use crate::domain::clock::SystemClock;
    use crate::storage::DbConnection;

    async fn setup_test() -> UserService {
        let db = DbConnection::in_memory().await.unwrap();
        UserService::new(UserRepository::new(db), Arc::new(SystemClock))
    }

    fn create(email: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Secretaria".to_string(),
            email: email.to_string(),
            password: "segredo123".to_string(),
            role: role.to_string(),
        }
    }

    fn update(email: &str, role: &str, password: Option<&str>) -> UpdateUserRequest {
        UpdateUserRequest {
            name: "Secretaria".to_string(),
            email: email.to_string(),
            password: password.map(str::to_string),
            role: role.to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let service = setup_test().await;

        let user = service.create(create("sec@igreja.com", ROLE_USER)).await.unwrap();

        let stored = service.users.get(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "segredo123");
        assert!(verify_password("segredo123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_role_and_short_password() {
        let service = setup_test().await;
        let mut request = create("sec@igreja.com", "Root");
        request.password = "123".to_string();

        match service.create(request).await.unwrap_err() {
            DomainError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_without_password_keeps_hash() {
        let service = setup_test().await;
        let id = service.create(create("sec@igreja.com", ROLE_USER)).await.unwrap().id;
        let before = service.users.get(id).await.unwrap().unwrap().password_hash;

        service.update(id, update("sec@igreja.com", ROLE_USER, Some("  "))).await.unwrap();
        assert_eq!(service.users.get(id).await.unwrap().unwrap().password_hash, before);

        service.update(id, update("sec@igreja.com", ROLE_USER, Some("novasenha"))).await.unwrap();
        let after = service.users.get(id).await.unwrap().unwrap().password_hash;
        assert!(verify_password("novasenha", &after).unwrap());
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_removed_or_demoted() {
        let service = setup_test().await;
        let admin = service.create(create("admin@igreja.com", ROLE_ADMIN)).await.unwrap().id;

        assert!(matches!(
            service.delete(admin).await.unwrap_err(),
            DomainError::InvalidState(_)
        ));
        assert!(matches!(
            service.update(admin, update("admin@igreja.com", ROLE_USER, None)).await.unwrap_err(),
            DomainError::InvalidState(_)
        ));

        service.create(create("outro@igreja.com", ROLE_ADMIN)).await.unwrap();
        service.delete(admin).await.unwrap();
        assert!(!service.get(admin).await.unwrap().is_active);
    }
}
