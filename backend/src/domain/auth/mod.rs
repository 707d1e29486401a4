//! # Authentication
//!
//! Password hashing, bearer tokens and the identity that authenticated
//! requests carry through the handlers.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtValidator};
pub use password::{hash_password, verify_password};

use shared::{ValidateTokenResponse, ROLE_ADMIN};

/// Identity of the caller, attached to every request that passed the bearer check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl From<AuthenticatedUser> for ValidateTokenResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}
