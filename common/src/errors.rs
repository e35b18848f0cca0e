//! Application error types.
//!
//! Classifies every failure the generation service can surface and maps each
//! class to an HTTP status plus an `ApiResponse` error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::ApiResponse;

/// Convenience result alias used across the services.
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request validation failed (empty question and the like). No external
    /// call is made for these.
    #[error("{0}")]
    Validation(String),

    /// The generation API reported quota/rate-limit exhaustion, after the
    /// retry budget was spent.
    #[error("{0}")]
    QuotaExceeded(String),

    /// The configured model identifier is unknown to the generation API.
    #[error("{0}")]
    ModelNotFound(String),

    /// The generation API failed in some other way (network, 5xx, bad payload).
    #[error("generation API error: {0}")]
    ExternalService(String),

    /// Anything unclassified. Never silently discarded.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            AppError::ModelNotFound(_) => "MODEL_NOT_FOUND",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::err(self.error_code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // 只取第一条校验消息，够用了
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .filter_map(|e| e.message.as_ref())
            .map(|m| m.to_string())
            .next()
            .unwrap_or_else(|| "validation failed".to_string());
        AppError::Validation(message)
    }
}
