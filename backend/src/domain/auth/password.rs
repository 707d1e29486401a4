//! Argon2id password hashing. Hashes are stored as PHC strings, which carry
//! their own salt and parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::domain::errors::DomainError;

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DomainError::Internal(format!("Failed to hash password: {e}")))
}

/// False on mismatch; an error only when `hash` is not a PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, DomainError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| DomainError::Internal(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
