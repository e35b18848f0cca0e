//! Application state for generation service.

use std::sync::Arc;

use common::config::{AppConfig, GeminiSettings};

use crate::gemini::GeminiClient;
use crate::retry::RetryPolicy;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub settings: GeminiSettings,
    pub gemini: Arc<GeminiClient>,
    pub retry: RetryPolicy,
}

impl AppState {
    /// Creates a new application state with an injected Gemini client.
    pub fn new(config: AppConfig, settings: GeminiSettings) -> Self {
        let gemini = Arc::new(GeminiClient::new(&settings));
        Self {
            config,
            settings,
            gemini,
            retry: RetryPolicy::default(),
        }
    }
}
