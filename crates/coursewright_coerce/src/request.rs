//! Generation request types.

use crate::OutputSpec;
use derive_getters::Getters;

/// The user side of a generation: one prompt, or several answered positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserPrompt {
    /// A single prompt producing a single record.
    Single(String),
    /// Several prompts, each producing one record of the result sequence.
    Many(Vec<String>),
}

impl UserPrompt {
    /// Whether this prompt produces a sequence of records.
    pub fn is_list(&self) -> bool {
        matches!(self, UserPrompt::Many(_))
    }

    /// Number of records the backend is expected to return.
    pub fn len(&self) -> usize {
        match self {
            UserPrompt::Single(_) => 1,
            UserPrompt::Many(prompts) => prompts.len(),
        }
    }

    /// Whether a list prompt has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the prompt as the text of one user message.
    ///
    /// A list is flattened into a numbered listing so the backend can keep
    /// its answers aligned with the inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use coursewright_coerce::UserPrompt;
    ///
    /// let prompt = UserPrompt::from(vec!["first".to_string(), "second".to_string()]);
    /// assert_eq!(prompt.render(), "1. first\n2. second");
    /// assert_eq!(UserPrompt::from("only").render(), "only");
    /// ```
    pub fn render(&self) -> String {
        match self {
            UserPrompt::Single(prompt) => prompt.clone(),
            UserPrompt::Many(prompts) => prompts
                .iter()
                .enumerate()
                .map(|(idx, prompt)| format!("{}. {}", idx + 1, prompt))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for UserPrompt {
    fn from(prompt: &str) -> Self {
        UserPrompt::Single(prompt.to_string())
    }
}

impl From<String> for UserPrompt {
    fn from(prompt: String) -> Self {
        UserPrompt::Single(prompt)
    }
}

impl From<Vec<String>> for UserPrompt {
    fn from(prompts: Vec<String>) -> Self {
        UserPrompt::Many(prompts)
    }
}

impl From<Vec<&str>> for UserPrompt {
    fn from(prompts: Vec<&str>) -> Self {
        UserPrompt::Many(prompts.into_iter().map(str::to_string).collect())
    }
}

/// One call to the structured output coercer.
///
/// Unset `model`, `temperature` and `max_tries` fall back to the coercer's
/// [`CoercerConfig`](crate::CoercerConfig). An unset `max_tokens` leaves the
/// completion length to the backend.
///
/// # Examples
///
/// ```
/// use coursewright_coerce::{GenerationRequest, OutputSpec};
///
/// let request = GenerationRequest::builder()
///     .system_prompt("You classify support tickets")
///     .user_prompt("My invoice is wrong")
///     .output_spec(OutputSpec::new().choices("team", ["billing", "technical"]))
///     .default_category(Some("other".to_string()))
///     .build()
///     .unwrap();
///
/// assert!(!request.user_prompt().is_list());
/// assert_eq!(*request.max_tries(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// Instructions for the backend, before the format suffix
    system_prompt: String,
    /// What to generate
    user_prompt: UserPrompt,
    /// Shape every record must have
    output_spec: OutputSpec,
    /// Replacement for enumerated values outside their allowed set
    #[builder(default)]
    default_category: Option<String>,
    /// Return bare values instead of keyed objects
    #[builder(default)]
    values_only: bool,
    /// Model override
    #[builder(default)]
    model: Option<String>,
    /// Sampling temperature override
    #[builder(default)]
    temperature: Option<f32>,
    /// Total attempt budget override
    #[builder(default)]
    max_tries: Option<usize>,
    /// Completion length cap passed to the backend on every attempt
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Log prompts and responses at info level
    #[builder(default)]
    verbose: bool,
}

impl GenerationRequest {
    /// Returns a builder for constructing a GenerationRequest.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    /// The default category, treating an empty string as absent.
    pub fn effective_default(&self) -> Option<&str> {
        self.default_category.as_deref().filter(|d| !d.is_empty())
    }
}
