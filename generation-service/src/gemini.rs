//! Google Gemini REST client.
//!
//! Thin typed wrapper over the `generateContent` endpoint. Every call builds a
//! fresh single-turn conversation; no history is kept across calls.

use common::config::GeminiSettings;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Errors surfaced by the generation API, keyed on the HTTP status the API
/// reports. Typed so callers match on the class instead of grepping error text.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Quota or rate limit exhausted (HTTP 429). The only retryable class.
    #[error("resource exhausted: {message}")]
    ResourceExhausted { message: String },

    /// Unknown model or endpoint (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Malformed request (HTTP 400).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other API-reported failure.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered 200 but produced no usable text.
    #[error("empty response from model")]
    EmptyResponse,
}

impl GeminiError {
    /// Whether this error is the transient-overload class worth retrying.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, GeminiError::ResourceExhausted { .. })
    }
}

/// Gemini API client.
///
/// Explicitly constructed and injected into the request handlers via
/// application state; there is no global client.
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    generation_config: GenerationConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Creates a client from the generation settings.
    pub fn new(settings: &GeminiSettings) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: settings.api_key.clone(),
            model: settings.model_name.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_p: settings.top_p,
                top_k: settings.top_k,
                max_output_tokens: settings.max_output_tokens,
            },
            http_client,
        }
    }

    /// Overrides the API base URL (used by tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Configured model identifier.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Sends one generation request and returns the raw response text.
    ///
    /// The request carries exactly one user turn; nothing from previous calls
    /// is included.
    pub async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_instruction.to_string()),
                }],
            }),
            generation_config: Some(self.generation_config.clone()),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("x-goog-api-key", value);
        }

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error(status.as_u16(), &body));
        }

        let generated: GenerateContentResponse = response.json().await?;
        generated
            .candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(|p| p.text.clone()))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GeminiError::EmptyResponse)
    }

    /// Maps a non-success HTTP status to a typed error, preferring the
    /// structured error body when the API provides one.
    fn map_error(status: u16, body: &str) -> GeminiError {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        match status {
            429 => GeminiError::ResourceExhausted { message },
            404 => GeminiError::NotFound { message },
            400 => GeminiError::InvalidRequest { message },
            _ => GeminiError::Api { status, message },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Sampling parameters, serialized in the API's camelCase convention.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
