//! The structured output retry loop.

use crate::prompt::{self, ShapeFlags};
use crate::repair::repair_json;
use crate::validate::{self, FormatError};
use crate::{Generated, GenerationRequest, UserPrompt};
use coursewright_core::{GenerateRequest, Message};
use coursewright_error::{CoerceError, CoerceErrorKind, CoursewrightResult};
use coursewright_interface::CoursewrightDriver;
use derive_getters::Getters;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Defaults applied when a [`GenerationRequest`] leaves a setting unset.
///
/// # Examples
///
/// ```
/// use coursewright_coerce::CoercerConfig;
///
/// let config = CoercerConfig::default();
/// assert_eq!(config.default_model(), "gpt-3.5-turbo");
/// assert_eq!(*config.max_tries(), 3);
///
/// let config = CoercerConfig::builder().max_tries(5_usize).build().unwrap();
/// assert_eq!(*config.max_tries(), 5);
/// assert_eq!(*config.temperature(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct CoercerConfig {
    /// Model used when the request names none
    default_model: String,
    /// Sampling temperature
    temperature: f32,
    /// Total attempts per generation
    max_tries: usize,
}

impl Default for CoercerConfig {
    fn default() -> Self {
        Self {
            default_model: "gpt-3.5-turbo".to_string(),
            temperature: 1.0,
            max_tries: 3,
        }
    }
}

impl CoercerConfig {
    /// Creates a config with every setting given.
    pub fn new(default_model: impl Into<String>, temperature: f32, max_tries: usize) -> Self {
        Self {
            default_model: default_model.into(),
            temperature,
            max_tries,
        }
    }

    /// Returns a builder for constructing a CoercerConfig.
    pub fn builder() -> CoercerConfigBuilder {
        CoercerConfigBuilder::default()
    }
}

/// Result of the shared attempt loop.
enum Outcome<T> {
    Valid(T),
    Exhausted { attempts: usize, last_error: String },
}

impl<T> Outcome<T> {
    fn or_exhausted(self) -> CoursewrightResult<T> {
        match self {
            Outcome::Valid(value) => Ok(value),
            Outcome::Exhausted {
                attempts,
                last_error,
            } => Err(CoerceError::new(CoerceErrorKind::Exhausted {
                attempts,
                last_error,
            })
            .into()),
        }
    }
}

/// Settings for one generation, resolved against the coercer defaults.
struct Resolved {
    model: String,
    temperature: f32,
    max_tries: usize,
    flags: ShapeFlags,
}

/// Coerces a backend's free-form text into validated JSON records.
///
/// Each attempt makes one backend call. Output that fails to parse or
/// validate is retried with the failure described in the next system
/// message. Driver errors end the generation immediately.
///
/// # Examples
///
/// ```no_run
/// use coursewright_coerce::{CoercerConfig, GenerationRequest, OutputSpec, StrictOutput};
/// use coursewright_interface::CoursewrightDriver;
///
/// # async fn run<D: CoursewrightDriver>(driver: D) -> Result<(), Box<dyn std::error::Error>> {
/// let coercer = StrictOutput::new(driver, CoercerConfig::default());
/// let request = GenerationRequest::builder()
///     .system_prompt("You are an AI capable of finding the most relevant image for a course")
///     .user_prompt("Provide a good image search term for a course titled \"Rust\"")
///     .output_spec(OutputSpec::new().describe("image_search_term", "a good search term"))
///     .build()?;
///
/// let generated = coercer.generate(&request).await?;
/// println!("{:?}", generated);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StrictOutput<D> {
    driver: D,
    config: CoercerConfig,
}

impl<D: CoursewrightDriver> StrictOutput<D> {
    /// Creates a coercer over `driver`.
    pub fn new(driver: D, config: CoercerConfig) -> Self {
        Self { driver, config }
    }

    /// The generation backend.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The defaults applied to requests.
    pub fn config(&self) -> &CoercerConfig {
        &self.config
    }

    /// Generates validated output, returning an empty result when every attempt fails.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid request or a driver failure. Malformed
    /// output never surfaces as an error here; check [`Generated::is_empty`].
    #[instrument(
        skip(self, request),
        fields(provider = self.driver.provider_name(), list_input = request.user_prompt().is_list())
    )]
    pub async fn generate(&self, request: &GenerationRequest) -> CoursewrightResult<Generated> {
        match self.run(request, Ok).await? {
            Outcome::Valid(generated) => Ok(generated),
            Outcome::Exhausted {
                attempts,
                last_error,
            } => {
                warn!(attempts, error = %last_error, "No valid output, returning empty result");
                Ok(Generated::empty())
            }
        }
    }

    /// Generates validated output, failing with [`CoerceErrorKind::Exhausted`] when every attempt fails.
    #[instrument(
        skip(self, request),
        fields(provider = self.driver.provider_name(), list_input = request.user_prompt().is_list())
    )]
    pub async fn generate_strict(
        &self,
        request: &GenerationRequest,
    ) -> CoursewrightResult<Generated> {
        self.run(request, Ok).await?.or_exhausted()
    }

    /// Generates output deserialized into `T`, failing with [`CoerceErrorKind::Exhausted`] when every attempt fails.
    ///
    /// Output that validates against the spec but does not deserialize into
    /// `T` counts as a failed attempt: the serde error is fed back and the
    /// backend is asked again.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use coursewright_coerce::{GenerationRequest, OutputSpec, StrictOutput};
    /// use coursewright_interface::CoursewrightDriver;
    ///
    /// #[derive(serde::Deserialize)]
    /// struct Term {
    ///     image_search_term: String,
    /// }
    ///
    /// # async fn run<D: CoursewrightDriver>(coercer: StrictOutput<D>) -> Result<(), Box<dyn std::error::Error>> {
    /// let request = GenerationRequest::builder()
    ///     .system_prompt("You find images for courses")
    ///     .user_prompt("A course titled \"Rust\"")
    ///     .output_spec(OutputSpec::new().describe("image_search_term", "a good search term"))
    ///     .build()?;
    ///
    /// let term: Term = coercer.generate_as(&request).await?;
    /// println!("{}", term.image_search_term);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(
        skip(self, request),
        fields(provider = self.driver.provider_name(), list_input = request.user_prompt().is_list())
    )]
    pub async fn generate_as<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> CoursewrightResult<T> {
        self.run(request, |generated| {
            serde_json::from_value(generated.into_value())
                .map_err(|e| FormatError::Mismatch(e.to_string()))
        })
        .await?
        .or_exhausted()
    }

    async fn run<T>(
        &self,
        request: &GenerationRequest,
        extract: impl Fn(Generated) -> Result<T, FormatError>,
    ) -> CoursewrightResult<Outcome<T>> {
        let resolved = self.resolve(request)?;
        let user = request.user_prompt().render();
        let mut feedback = String::new();
        let mut last_error = String::new();

        for attempt in 1..=resolved.max_tries {
            let system = prompt::system_message(request, resolved.flags, &feedback);
            let call = GenerateRequest::builder()
                .messages(vec![Message::system(system.as_str()), Message::user(user.as_str())])
                .model(Some(resolved.model.clone()))
                .temperature(Some(resolved.temperature))
                .max_tokens(*request.max_tokens())
                .build()
                .map_err(|e| CoerceError::new(CoerceErrorKind::InvalidRequest(e.to_string())))?;

            let response = self.driver.generate(&call).await?;
            debug!(attempt, usage = ?response.usage(), "Backend call complete");
            let raw = response.first_text().unwrap_or_default();
            let repaired = repair_json(raw);
            log_exchange(*request.verbose(), attempt, &system, &user, &repaired);

            match interpret(request, resolved.flags, raw, &repaired).and_then(&extract) {
                Ok(value) => {
                    debug!(attempt, "Output validated");
                    return Ok(Outcome::Valid(value));
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_tries = resolved.max_tries,
                        error = %err,
                        response = %repaired,
                        "Output failed validation"
                    );
                    last_error = err.to_string();
                    feedback = prompt::feedback(&repaired, &last_error);
                }
            }
        }

        Ok(Outcome::Exhausted {
            attempts: resolved.max_tries,
            last_error,
        })
    }

    fn resolve(&self, request: &GenerationRequest) -> Result<Resolved, CoerceError> {
        let invalid = |reason: &str| {
            Err(CoerceError::new(CoerceErrorKind::InvalidRequest(
                reason.to_string(),
            )))
        };

        if let UserPrompt::Many(prompts) = request.user_prompt()
            && prompts.is_empty()
        {
            return invalid("user prompt list is empty");
        }
        if request.output_spec().is_empty() {
            return invalid("output spec declares no fields");
        }

        let max_tries = request.max_tries().unwrap_or(*self.config.max_tries());
        if max_tries == 0 {
            return invalid("max_tries must be at least 1");
        }
        let temperature = request.temperature().unwrap_or(*self.config.temperature());
        if !temperature.is_finite() {
            return invalid("temperature must be a finite number");
        }

        Ok(Resolved {
            model: request
                .model()
                .clone()
                .unwrap_or_else(|| self.config.default_model().clone()),
            temperature,
            max_tries,
            flags: ShapeFlags::detect(request.user_prompt(), request.output_spec()),
        })
    }
}

/// Parses and validates one attempt's output.
fn interpret(
    request: &GenerationRequest,
    flags: ShapeFlags,
    raw: &str,
    repaired: &str,
) -> Result<Generated, FormatError> {
    if raw.trim().is_empty() {
        return Err(FormatError::Empty);
    }

    let value: Value =
        serde_json::from_str(repaired).map_err(|e| FormatError::Parse(e.to_string()))?;
    let mut records = validate::normalize(value, flags.list_input, request.user_prompt().len())?;

    for record in records.iter_mut() {
        validate::validate_record(record, request.output_spec(), request.effective_default(), "")?;
    }

    if *request.values_only() {
        records = records.into_iter().map(validate::values_only).collect();
    }

    if flags.list_input {
        Ok(Generated::Records(records))
    } else {
        Ok(records
            .into_iter()
            .next()
            .map(Generated::Record)
            .unwrap_or_else(Generated::empty))
    }
}

fn log_exchange(verbose: bool, attempt: usize, system: &str, user: &str, response: &str) {
    if verbose {
        info!(attempt, system_prompt = %system, user_prompt = %user, "Sent prompts");
        info!(attempt, response = %response, "Received response");
    } else {
        debug!(attempt, system_prompt = %system, user_prompt = %user, "Sent prompts");
        debug!(attempt, response = %response, "Received response");
    }
}
