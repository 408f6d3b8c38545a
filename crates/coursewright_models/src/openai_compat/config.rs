//! Connection settings for OpenAI-compatible backends.

use coursewright_error::{ModelError, ModelErrorKind};
use derive_getters::Getters;

/// Default API root for OpenAI.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Connection settings for an OpenAI-compatible backend.
///
/// # Examples
///
/// ```
/// use coursewright_models::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .api_key("sk-test")
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.base_url(), "https://api.openai.com/v1");
/// assert_eq!(*config.max_retries(), 3);
/// assert!(!format!("{:?}", config).contains("sk-test"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ClientConfig {
    /// Bearer token sent with every request
    api_key: String,
    /// API root; `/chat/completions` is appended
    #[builder(default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,
    /// Model used when a request names none
    #[builder(default = "DEFAULT_MODEL.to_string()")]
    model: String,
    /// Per-request timeout in seconds
    #[builder(default = "60")]
    timeout_secs: u64,
    /// Transport-level retries for network errors and retryable statuses
    #[builder(default = "3")]
    max_retries: usize,
}

impl ClientConfig {
    /// Returns a builder for constructing a ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_BASE_URL` (default: "https://api.openai.com/v1")
    /// - `OPENAI_MODEL` (default: "gpt-3.5-turbo")
    pub fn from_env() -> Result<Self, ModelError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::new(ModelErrorKind::MissingApiKey))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        ClientConfig::builder()
            .api_key(api_key)
            .base_url(base_url)
            .model(model)
            .build()
            .map_err(|e| ModelError::new(ModelErrorKind::Builder(e.to_string())))
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
