//! # Auth Service
//!
//! Login, bearer-token authentication and the startup admin seed.

use std::sync::Arc;
use tracing::{info, warn};

use shared::{LoginRequest, LoginResponse, User, ROLE_ADMIN};

use crate::domain::auth::{hash_password, verify_password, AuthenticatedUser, JwtValidator};
use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::storage::{StoredUser, UserRepository};

const INVALID_CREDENTIALS: &str = "Email ou senha inválidos";
const DEFAULT_ADMIN_NAME: &str = "Administrador";

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtValidator,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt: JwtValidator, clock: Arc<dyn Clock>) -> Self {
        Self { users, jwt, clock }
    }

    /// Unknown email, wrong password and deactivated accounts all produce the
    /// same error
    pub async fn login(&self, request: LoginRequest) -> DomainResult<LoginResponse> {
        let email = request.email.trim();
        info!("Login attempt for {}", email);

        let stored = match self.users.get_by_email(email).await? {
            Some(stored) if stored.user.is_active => stored,
            _ => {
                warn!("Login rejected for {}", email);
                return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };
        if !verify_password(&request.password, &stored.password_hash)? {
            warn!("Login rejected for {}: wrong password", email);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let identity = identity_of(&stored);
        let token = self.jwt.generate_token(&identity)?;

        info!("User {} logged in", identity.id);
        Ok(LoginResponse {
            token,
            name: identity.name,
            email: identity.email,
            role: identity.role,
        })
    }

    /// Verifies the token and reloads the user, so deactivation and role
    /// changes apply to tokens already issued
    pub async fn authenticate(&self, token: &str) -> DomainResult<AuthenticatedUser> {
        let claims = self.jwt.verify_token(token)?;
        let id: i64 = claims
            .sub
            .parse()
            .map_err(|_| DomainError::Unauthorized("Token inválido".to_string()))?;

        match self.users.get(id).await? {
            Some(stored) if stored.user.is_active => Ok(identity_of(&stored)),
            _ => {
                warn!("Token for unknown or inactive user {}", id);
                Err(DomainError::Unauthorized("Usuário inativo ou inexistente".to_string()))
            }
        }
    }

    /// Creates the configured admin unless a user with that email already exists
    pub async fn ensure_admin(&self, email: &str, password: &str) -> DomainResult<()> {
        if self.users.get_by_email(email).await?.is_some() {
            info!("Admin user {} already present", email);
            return Ok(());
        }

        let admin = User {
            id: 0,
            name: DEFAULT_ADMIN_NAME.to_string(),
            email: email.to_string(),
            role: ROLE_ADMIN.to_string(),
            created_at: self.clock.now(),
            is_active: true,
        };
        let id = self.users.create(&admin, &hash_password(password)?).await?;

        info!("Seeded admin user {} with ID {}", email, id);
        Ok(())
    }
}

fn identity_of(stored: &StoredUser) -> AuthenticatedUser {
    AuthenticatedUser {
        id: stored.user.id,
        name: stored.user.name.clone(),
        email: stored.user.email.clone(),
        role: stored.user.role.clone(),
    }
}
