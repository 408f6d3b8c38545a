//! Structured output coercion for generation backends.
//!
//! A [`StrictOutput`] wraps a [`CoursewrightDriver`](coursewright_interface::CoursewrightDriver)
//! and turns its free-form text into JSON records shaped by an [`OutputSpec`].
//! Each attempt appends format instructions to the system prompt, repairs
//! the common JSON mistakes models make (see [`repair`]), and validates the
//! result. Failed attempts are retried with the error fed back to the model.

mod coercer;
mod generated;
mod prompt;
pub mod repair;
mod request;
mod spec;
mod validate;

pub use coercer::{CoercerConfig, CoercerConfigBuilder, StrictOutput};
pub use generated::Generated;
pub use prompt::{ShapeFlags, format_instructions};
pub use request::{GenerationRequest, GenerationRequestBuilder, UserPrompt};
pub use spec::{FieldSpec, OutputSpec, SpecKey, contains_placeholder};
pub use validate::FormatError;
