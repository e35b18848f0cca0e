//! API response wrapper types.
//!
//! Provides a unified response format for all API endpoints. Derives
//! `Deserialize` as well so the console client can read the same envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard API response wrapper.
///
/// All API endpoints return responses in this format for consistency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,

    /// Response data (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// Response metadata.
    pub meta: ResponseMeta,
}

/// API error details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code for client handling (e.g., "VALIDATION_ERROR", "QUOTA_EXCEEDED").
    pub code: String,

    /// Human-readable error message.
    pub message: String,
}

/// Response metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResponseMeta {
    /// Request ID for tracing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Response timestamp.
    pub timestamp: DateTime<Utc>,

    /// Service name that handled the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            request_id: None,
            timestamp: Utc::now(),
            service: None,
        }
    }
}

impl ResponseMeta {
    /// Creates a new ResponseMeta with service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            ..Default::default()
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response with data.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: ResponseMeta::default(),
        }
    }

    /// Creates a successful response with service name.
    pub fn ok_with_service(data: T, service: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: ResponseMeta::with_service(service),
        }
    }

    /// Sets the request ID on the response.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.meta.request_id = Some(request_id.into());
        self
    }
}

impl ApiResponse<()> {
    /// Creates an error response.
    pub fn err(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
            meta: ResponseMeta::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let resp = ApiResponse::ok_with_service("data", "generation-service");
        assert!(resp.success);
        assert_eq!(resp.data, Some("data"));
        assert!(resp.error.is_none());
        assert_eq!(resp.meta.service.as_deref(), Some("generation-service"));
    }

    #[test]
    fn test_err_envelope_shape() {
        let resp = ApiResponse::err("QUOTA_EXCEEDED", "API quota exceeded");
        assert!(!resp.success);
        let error = resp.error.expect("error details");
        assert_eq!(error.code, "QUOTA_EXCEEDED");
    }
}
