//! Error type shared by every domain service.
//!
//! The REST layer turns each variant into an HTTP status, so services never
//! deal with status codes themselves.

use crate::domain::certificate::RenderError;
use crate::domain::validation::FieldError;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{entity} {id} não encontrado")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("dados inválidos")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("file storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("certificate rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    pub fn duplicate_email() -> Self {
        Self::Conflict("Já existe um cadastro com este email".to_string())
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::duplicate_email()
            }
            _ => Self::Database(err),
        }
    }
}
