//! Generic client for OpenAI-compatible APIs.

use crate::openai_compat::{ChatRequest, ChatResponse, ClientConfig, conversions};
use async_trait::async_trait;
use coursewright_core::{GenerateRequest, GenerateResponse};
use coursewright_error::{CoursewrightResult, ModelError, ModelErrorKind, RetryableError};
use coursewright_interface::CoursewrightDriver;
use reqwest::Client;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, error, instrument, warn};

/// Generic client for any OpenAI-compatible API.
///
/// Network failures and retryable statuses (408, 429, 5xx) are retried with
/// jittered exponential backoff up to `max_retries` times. Every other
/// failure is returned on the first occurrence.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    config: ClientConfig,
    provider_name: &'static str,
}

impl OpenAICompatibleClient {
    /// Creates a new OpenAI-compatible client.
    ///
    /// # Arguments
    ///
    /// * `config` - Connection settings
    /// * `provider_name` - Name of the provider (for logging/tracing)
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    #[instrument(skip(config), fields(provider = provider_name, model = %config.model()))]
    pub fn new(config: ClientConfig, provider_name: &'static str) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .build()
            .map_err(|e| {
                ModelError::new(ModelErrorKind::Http(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        debug!(
            provider = provider_name,
            model = %config.model(),
            url = %config.completions_url(),
            "Created OpenAI-compatible client"
        );

        Ok(Self {
            client,
            config,
            provider_name,
        })
    }

    /// Creates an OpenAI client from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, ModelError> {
        Self::new(ClientConfig::from_env()?, "openai")
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends one chat request without retrying.
    async fn send_once(&self, chat_request: &ChatRequest) -> Result<ChatResponse, ModelError> {
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key())
            .json(chat_request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.provider_name, error = ?e, "HTTP request failed");
                ModelError::new(ModelErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                provider = self.provider_name,
                status = %status,
                error = %error_text,
                "API error"
            );

            return Err(ModelError::new(ModelErrorKind::Api {
                status: status.as_u16(),
                message: error_text,
            }));
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            error!(provider = self.provider_name, error = ?e, "Failed to parse response");
            ModelError::new(ModelErrorKind::ResponseParsing(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })
    }

    /// Sends a chat request, retrying transient failures.
    #[instrument(skip(self, chat_request), fields(provider = self.provider_name, model = %chat_request.model()))]
    async fn send_with_retry(&self, chat_request: &ChatRequest) -> Result<ChatResponse, ModelError> {
        let strategy = ExponentialBackoff::from_millis(500)
            .factor(2)
            .max_delay(Duration::from_secs(30))
            .map(jitter)
            .take(*self.config.max_retries());

        Retry::spawn(strategy, move || async move {
            match self.send_once(chat_request).await {
                Ok(response) => Ok(response),
                Err(err) if err.is_retryable() => {
                    warn!(
                        provider = self.provider_name,
                        error = %err,
                        "Transient backend failure, retrying"
                    );
                    RetryError::to_transient(err)
                }
                Err(err) => RetryError::to_permanent(err),
            }
        })
        .await
    }
}

#[async_trait]
impl CoursewrightDriver for OpenAICompatibleClient {
    /// Generates a response from the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries or the response
    /// cannot be parsed.
    #[instrument(skip(self, req), fields(provider = self.provider_name, model = %self.config.model()))]
    async fn generate(&self, req: &GenerateRequest) -> CoursewrightResult<GenerateResponse> {
        let chat_request = conversions::to_chat_request(req, self.config.model())?;

        debug!(
            provider = self.provider_name,
            model = %chat_request.model(),
            message_count = chat_request.messages().len(),
            "Sending request"
        );

        let chat_response = self.send_with_retry(&chat_request).await?;

        debug!(
            provider = self.provider_name,
            choices = chat_response.choices.len(),
            "Received response"
        );

        Ok(conversions::from_chat_response(&chat_response)?)
    }

    fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    fn model_name(&self) -> &str {
        self.config.model()
    }
}
