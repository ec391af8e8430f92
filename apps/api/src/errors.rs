use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::llm_client::LlmError;
use crate::signature::pad::SignatureError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Stored document is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => AppError::MissingCredential("ANTHROPIC_API_KEY"),
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Cache(e) => {
                tracing::error!("Redis error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CACHE_ERROR",
                    "The draft store is unavailable".to_string(),
                )
            }
            AppError::Corrupt(e) => {
                tracing::error!("Corrupt document record: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CORRUPT_RECORD",
                    "The stored document could not be read".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::MissingCredential(name) => {
                tracing::warn!("Generation requested without {name}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MISSING_CREDENTIAL",
                    "AI generation is not configured".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Export(ExportError::EmptyCapture { bytes }) => {
                tracing::warn!("Capture rejected: {bytes} bytes");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_CAPTURE",
                    "The document rendered to an empty image".to_string(),
                )
            }
            AppError::Export(ExportError::FontUnavailable { family }) => {
                tracing::error!("PDF export without a usable {family:?} font");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "FONT_UNAVAILABLE",
                    "PDF export is unavailable: the document font could not be loaded".to_string(),
                )
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "The document could not be exported".to_string(),
                )
            }
            AppError::Signature(e) => (StatusCode::BAD_REQUEST, "SIGNATURE_ERROR", e.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_capture_is_unprocessable() {
        let response = AppError::Export(ExportError::EmptyCapture { bytes: 12 }).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_missing_font_is_service_unavailable() {
        let err = AppError::Export(ExportError::FontUnavailable {
            family: crate::models::design::FontFamily::Lato,
        });
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_missing_key_maps_to_missing_credential() {
        let err: AppError = LlmError::MissingApiKey.into();
        assert!(matches!(err, AppError::MissingCredential("ANTHROPIC_API_KEY")));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_llm_failure_is_bad_gateway() {
        let err: AppError = LlmError::EmptyContent.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
