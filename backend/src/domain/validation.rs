//! Request validation.
//!
//! Each service builds a [`Validator`], runs its field checks and calls
//! [`Validator::finish`], which reports every failing field at once before
//! anything touches the store.

use serde::Serialize;

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "campo obrigatório");
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.push(field, &format!("máximo de {} caracteres", max));
        }
        self
    }

    pub fn max_len_opt(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.max_len(field, value, max);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !is_valid_email(value.trim()) {
            self.push(field, "email inválido");
        }
        self
    }

    pub fn email_opt(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.email(field, value);
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.contains(&value) {
            self.push(field, &format!("deve ser um de: {}", allowed.join(", ")));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.push(field, "não pode ser negativo");
        }
        self
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.push(field, message);
        }
        self
    }

    pub fn finish(&mut self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(std::mem::take(&mut self.errors)))
        }
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Trims an optional text field and treats blank input as absent
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed text, or `default` when blank or absent
pub fn or_default(value: Option<String>, default: &str) -> String {
    clean(value).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_failing_field() {
        let mut validator = Validator::new();
        validator
            .required("name", "  ")
            .email("email", "not-an-email")
            .max_len("phone", "123456789012345678901", 20);

        match validator.finish() {
            Err(DomainError::Validation(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "phone"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let mut validator = Validator::new();
        validator
            .required("name", "Maria")
            .email("email", "maria@igreja.com")
            .one_of("belt", "Azul", &["Branca", "Azul"])
            .non_negative("fee", 0.0);

        assert!(validator.finish().is_ok());
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn test_max_len_counts_characters_not_bytes() {
        let mut validator = Validator::new();
        validator.max_len("name", "ção", 3);
        assert!(validator.finish().is_ok());
    }

    #[test]
    fn test_clean_drops_blank_values() {
        assert_eq!(clean(Some("  ".to_string())), None);
        assert_eq!(clean(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(or_default(None, "Igreja"), "Igreja");
    }
}
