// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro único da aplicação. Toda falha vira um JSON `{ "message": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("One or more fields are invalid.")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    // Requisição que o axum não conseguiu interpretar
    #[error("{}", .0.body_text())]
    JsonRejection(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    QueryRejection(#[from] QueryRejection),

    #[error("{}", .0.body_text())]
    PathRejection(#[from] PathRejection),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Missing or invalid authentication token.")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Qualquer outro erro inesperado, com contexto do anyhow
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Safety analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("Document generation failed: {0}")]
    DocumentError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::JsonRejection(_)
            | AppError::QueryRejection(_)
            | AppError::PathRejection(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: &str, id: i64) -> Self {
        AppError::NotFound(format!("{what} {id} was not found."))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            // Devolve todos os detalhes da validação, campo a campo.
            AppError::ValidationError(ref errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "message": self.to_string(),
                    "details": details,
                })
            }

            // 500: o detalhe vai para o log, o cliente recebe uma mensagem genérica.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Internal server error: {}", e);
                json!({ "message": "An unexpected error occurred." })
            }

            ref e => json!({ "message": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn conflict_maps_to_409_with_message() {
        let response = AppError::Conflict("Department 'Stores' already exists.".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Department 'Stores' already exists.");
    }

    #[tokio::test]
    async fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("Name is required.".into());
        errors.add("name", err);

        let response = AppError::ValidationError(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["details"]["name"][0], "Name is required.");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = AppError::DocumentError("font missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "An unexpected error occurred.");
    }

    #[test]
    fn auth_errors_are_401() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::not_found("Unit", 3).status(), StatusCode::NOT_FOUND);
    }
}
