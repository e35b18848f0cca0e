//! Environment-based configuration.
//!
//! All knobs come from environment variables with sensible defaults, so the
//! services start with no configuration at all (except the API key).

/// Basic service configuration shared by all binaries.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name (used in logs and response metadata).
    pub service: String,
    /// Bind address host.
    pub host: String,
    /// Bind address port.
    pub port: u16,
    /// Outbound HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Loads configuration from the environment for a named service.
    ///
    /// `HOST` and `SERVER_PORT` override the defaults; unparsable values
    /// fall back silently.
    pub fn load_with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 60),
        }
    }
}

/// Settings for the hosted generation API (Google Gemini).
///
/// Mirrors the knobs the `generateContent` endpoint accepts. The key is the
/// only value without a usable default.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// API key (`GEMINI_API_KEY`). Empty string when not configured.
    pub api_key: String,
    /// Model identifier (`GEMINI_MODEL`).
    pub model_name: String,
    /// Sampling temperature (`GEMINI_TEMPERATURE`).
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
    /// Top-k sampling parameter.
    pub top_k: u32,
    /// Maximum number of tokens in the generated output (`GEMINI_MAX_OUTPUT_TOKENS`).
    pub max_output_tokens: u32,
}

impl GeminiSettings {
    /// Loads generation API settings from the environment.
    pub fn load() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model_name: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            temperature: env_parse("GEMINI_TEMPERATURE", 0.2),
            top_p: env_parse("GEMINI_TOP_P", 0.8),
            top_k: env_parse("GEMINI_TOP_K", 40),
            max_output_tokens: env_parse("GEMINI_MAX_OUTPUT_TOKENS", 4096),
        }
    }

    /// Whether an API credential is configured.
    pub fn api_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // 环境变量未设置时使用默认值
        let settings = GeminiSettings {
            api_key: String::new(),
            model_name: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 4096,
        };
        assert!(!settings.api_configured());
    }

    #[test]
    fn test_api_configured_ignores_whitespace() {
        let mut settings = GeminiSettings::load();
        settings.api_key = "   ".to_string();
        assert!(!settings.api_configured());
        settings.api_key = "key".to_string();
        assert!(settings.api_configured());
    }
}
