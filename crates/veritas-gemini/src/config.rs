//! Gemini client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{GeminiError, GeminiResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for [`crate::GeminiClient`].
///
/// The API key is checked when the config is built, so a missing
/// credential fails before any remote call is made.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: String,
    /// Service root, without a trailing slash
    pub base_url: String,
    /// Model used for every `generateContent` call
    pub model: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Create a config with default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> GeminiResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(GeminiError::config("GEMINI_API_KEY must not be empty"));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(300),
        })
    }

    /// Create config from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::config("GEMINI_API_KEY not set"))?;

        let mut config = Self::new(api_key)?;

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config = config.with_base_url(&base_url)?;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config = config.with_model(model);
        }
        if let Some(secs) = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Point the client at another endpoint (a proxy, or a mock server in tests).
    pub fn with_base_url(mut self, base_url: &str) -> GeminiResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| GeminiError::config(format!("invalid base URL '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GeminiError::config(format!(
                "base URL must be http(s): {}",
                base_url
            )));
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model.trim().to_string();
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_fails_fast() {
        assert!(matches!(GeminiConfig::new(""), Err(GeminiError::Config(_))));
        assert!(matches!(GeminiConfig::new("   "), Err(GeminiError::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config = GeminiConfig::new("key").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(300));

        let config = config.with_timeout(Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_base_url_validation() {
        let config = GeminiConfig::new("key")
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/")
            .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");

        assert!(GeminiConfig::new("key").unwrap().with_base_url("not a url").is_err());
        assert!(GeminiConfig::new("key")
            .unwrap()
            .with_base_url("ftp://example.com")
            .is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_blank_model_keeps_default() {
        let config = GeminiConfig::new("key").unwrap().with_model("  ");
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
