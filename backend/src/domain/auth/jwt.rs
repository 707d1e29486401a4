//! HS256 bearer tokens.
//!
//! Tokens name the user id as `sub` and carry the display name, email and
//! role so the admin UI can render without another round trip. Issuer and
//! audience are both checked on the way in.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::errors::{DomainError, DomainResult};

const MIN_SECRET_LEN: usize = 32;
const DEV_SECRET: &str = "dev-mode-secret-not-for-production-use-123456";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
    issuer: String,
    audience: String,
}

impl JwtValidator {
    /// Fails when the secret is missing or shorter than 32 characters
    pub fn new(
        secret: String,
        expiry_seconds: u64,
        issuer: String,
        audience: String,
    ) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET is required outside dev mode");
        }
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters", MIN_SECRET_LEN);
        }

        Ok(Self { secret, expiry_seconds, issuer, audience })
    }

    /// Validator with a fixed, publicly known secret
    pub fn new_dev(issuer: String, audience: String) -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiry_seconds: 8 * 60 * 60,
            issuer,
            audience,
        }
    }

    pub fn generate_token(&self, user: &AuthenticatedUser) -> DomainResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DomainError::Internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            iat: now,
            exp: now + self.expiry_seconds,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| DomainError::Internal(format!("Failed to generate token: {}", e)))
    }

    pub fn verify_token(&self, token: &str) -> DomainResult<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| {
            let message = match err.kind() {
                ErrorKind::ExpiredSignature => "Token expirado",
                ErrorKind::InvalidSignature => "Assinatura inválida",
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => "Token não pertence a este sistema",
                _ => "Token inválido",
            };
            DomainError::Unauthorized(message.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JwtValidator {
        JwtValidator::new(
            "a-very-long-test-secret-with-at-least-32-chars".to_string(),
            3600,
            "church-admin".to_string(),
            "church-admin-ui".to_string(),
        )
        .unwrap()
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: 7,
            name: "Administrador".to_string(),
            email: "admin@igreja.com".to_string(),
            role: "Admin".to_string(),
        }
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = JwtValidator::new("short".to_string(), 60, "i".to_string(), "a".to_string());
        assert!(result.is_err());
        let result = JwtValidator::new(String::new(), 60, "i".to_string(), "a".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let jwt = validator();
        let token = jwt.generate_token(&user()).unwrap();

        let claims = jwt.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "Admin");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_secret_is_unauthorized() {
        let token = JwtValidator::new_dev("church-admin".to_string(), "church-admin-ui".to_string())
            .generate_token(&user())
            .unwrap();

        let err = validator().verify_token(&token).unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_audience_is_unauthorized() {
        let other = JwtValidator::new(
            "a-very-long-test-secret-with-at-least-32-chars".to_string(),
            3600,
            "church-admin".to_string(),
            "someone-else".to_string(),
        )
        .unwrap();
        let token = other.generate_token(&user()).unwrap();

        assert!(validator().verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_is_unauthorized() {
        assert!(matches!(
            validator().verify_token("not.a.token").unwrap_err(),
            DomainError::Unauthorized(_)
        ));
    }
}
