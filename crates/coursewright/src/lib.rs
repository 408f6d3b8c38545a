//! Coursewright: structured output from language models, applied to course curation.
//!
//! This facade re-exports the workspace crates:
//!
//! - [`StrictOutput`] coerces free-form completions into JSON shaped by an [`OutputSpec`]
//! - [`OpenAICompatibleClient`] talks to any chat-completions endpoint
//! - the curriculum generators build outlines, summaries and quizzes on top
//!
//! # Example
//!
//! ```no_run
//! use coursewright::{
//!     CoercerConfig, GenerationRequest, OpenAICompatibleClient, OutputSpec, StrictOutput,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let coercer = StrictOutput::new(OpenAICompatibleClient::from_env()?, CoercerConfig::default());
//! let request = GenerationRequest::builder()
//!     .system_prompt("You classify course topics")
//!     .user_prompt("Ownership and borrowing")
//!     .output_spec(OutputSpec::new().choices("difficulty", ["beginner", "advanced"]))
//!     .build()?;
//!
//! let generated = coercer.generate_strict(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&generated)?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
mod settings;

pub use coursewright_coerce::{
    CoercerConfig, CoercerConfigBuilder, FieldSpec, FormatError, Generated, GenerationRequest,
    GenerationRequestBuilder, OutputSpec, ShapeFlags, SpecKey, StrictOutput, UserPrompt,
    format_instructions, repair,
};
pub use coursewright_core::{GenerateRequest, GenerateResponse, Message, Output, Role};
pub use coursewright_curriculum::{
    ChapterOutline, DEFAULT_QUIZ_QUESTIONS, QuizQuestion, UnitOutline, generate_course_outline,
    generate_image_search_term, generate_quiz, summarize_transcript,
};
pub use coursewright_error::{
    CoerceError, CoerceErrorKind, ConfigError, ConfigErrorKind, CoursewrightError,
    CoursewrightErrorKind, CoursewrightResult, ModelError, ModelErrorKind,
};
pub use coursewright_interface::CoursewrightDriver;
pub use coursewright_models::{ClientConfig, OpenAICompatibleClient};
pub use settings::{AppConfig, CONFIG_FILE_NAME, ENV_PREFIX};
