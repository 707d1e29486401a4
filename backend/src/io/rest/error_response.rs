//! Maps domain errors onto HTTP status codes and the `{message, errors}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorResponse, FieldErrorResponse};
use tracing::error;

use crate::domain::DomainError;

const INTERNAL_MESSAGE: &str = "Erro interno do servidor";

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, message(self.to_string())),
            DomainError::Conflict(msg) => (StatusCode::CONFLICT, message(msg)),
            DomainError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    message: "Dados inválidos".to_string(),
                    errors: errors
                        .into_iter()
                        .map(|e| FieldErrorResponse { field: e.field, message: e.message })
                        .collect(),
                },
            ),
            DomainError::InvalidState(msg) => (StatusCode::BAD_REQUEST, message(msg)),
            DomainError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, message(msg)),
            DomainError::Forbidden(msg) => (StatusCode::FORBIDDEN, message(msg)),
            DomainError::Io(_)
            | DomainError::Render(_)
            | DomainError::Database(_)
            | DomainError::Internal(_) => {
                error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, message(INTERNAL_MESSAGE.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}

fn message(message: String) -> ErrorResponse {
    ErrorResponse { message, errors: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::FieldError;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_lists_every_field() {
        let response = DomainError::Validation(vec![
            FieldError::new("email", "email inválido"),
            FieldError::new("phone", "campo obrigatório"),
        ])
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body.message, "Dados inválidos");
        assert_eq!(body.errors.len(), 2);
        assert_eq!(body.errors[0].field, "email");
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = [
            (DomainError::not_found("Membro", 4), StatusCode::NOT_FOUND),
            (DomainError::duplicate_email(), StatusCode::CONFLICT),
            (DomainError::InvalidState("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let err = DomainError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/wwwroot/uploads denied",
        ));

        let body = body_of(err.into_response()).await;
        assert_eq!(body.message, INTERNAL_MESSAGE);
        assert!(body.errors.is_empty());
    }
}
