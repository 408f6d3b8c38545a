//! Layered configuration for the `coursewright` binary.

use config::{Config, Environment, File};
use coursewright_coerce::CoercerConfig;
use coursewright_error::{ConfigError, ConfigErrorKind, CoursewrightResult};
use coursewright_models::ClientConfig;
use coursewright_models::openai_compat::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user configuration file.
pub const CONFIG_FILE_NAME: &str = "coursewright.toml";

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "COURSEWRIGHT";

/// Settings for the command-line tool.
///
/// Sources are layered, later ones winning:
///
/// 1. built-in defaults
/// 2. `<config dir>/coursewright/coursewright.toml`, if present
/// 3. an explicit `--config` file
/// 4. `COURSEWRIGHT_*` environment variables
/// 5. command-line flags, via [`with_overrides`](AppConfig::with_overrides)
///
/// # Examples
///
/// ```
/// use coursewright::AppConfig;
///
/// let config = AppConfig::default().with_overrides(Some("gpt-4o-mini".to_string()), None);
/// assert_eq!(config.model(), "gpt-4o-mini");
/// assert_eq!(*config.max_tries(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct AppConfig {
    /// Chat model used for every generation
    model: String,
    /// API root of the OpenAI-compatible backend
    base_url: String,
    /// Sampling temperature
    temperature: f32,
    /// Attempts per structured generation
    max_tries: usize,
    /// HTTP request timeout in seconds
    timeout_secs: u64,
    /// Transport-level retries per backend call
    transport_retries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 1.0,
            max_tries: 3,
            timeout_secs: 60,
            transport_retries: 3,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the user file, `explicit`, and the environment.
    #[tracing::instrument]
    pub fn load(explicit: Option<&Path>) -> CoursewrightResult<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX).try_parsing(true);
        Self::from_layers(Self::user_config_path().as_deref(), explicit, environment)
    }

    /// Location of the per-user configuration file, if the platform has a config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("coursewright").join(CONFIG_FILE_NAME))
    }

    /// Builds configuration from explicit sources.
    ///
    /// `user_file` may be missing; `explicit` must exist.
    pub fn from_layers(
        user_file: Option<&Path>,
        explicit: Option<&Path>,
        environment: Environment,
    ) -> CoursewrightResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = user_file {
            debug!(path = %path.display(), "Adding user config layer");
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Adding config file layer");
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Self = builder
            .add_source(environment)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Applies command-line flags on top of the loaded layers.
    pub fn with_overrides(mut self, model: Option<String>, max_tries: Option<usize>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(max_tries) = max_tries {
            self.max_tries = max_tries;
        }
        self
    }

    /// Rejects settings the coercer or client cannot run with.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tries == 0 {
            return Err(ConfigError::invalid_setting("max_tries", "must be at least 1"));
        }
        if !self.temperature.is_finite() {
            return Err(ConfigError::invalid_setting(
                "temperature",
                "must be a finite number",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid_setting("model", "must not be empty"));
        }
        Ok(())
    }

    /// Coercer defaults derived from these settings.
    pub fn coercer_config(&self) -> CoercerConfig {
        CoercerConfig::new(self.model.clone(), self.temperature, self.max_tries)
    }

    /// HTTP client settings using `api_key`.
    pub fn client_config(&self, api_key: impl Into<String>) -> CoursewrightResult<ClientConfig> {
        Ok(ClientConfig::builder()
            .api_key(api_key.into())
            .base_url(self.base_url.clone())
            .model(self.model.clone())
            .timeout_secs(self.timeout_secs)
            .max_retries(self.transport_retries)
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Client(e.to_string())))?)
    }
}
