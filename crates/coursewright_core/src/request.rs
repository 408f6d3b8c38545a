//! Request and response types for generation.

use crate::{Message, Output, TokenUsage};
use serde::{Deserialize, Serialize};

/// Backend-neutral generation request.
///
/// # Examples
///
/// ```
/// use coursewright_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::system("Be terse."), Message::user("Hi")])
///     .temperature(Some(0.2_f32))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 2);
/// assert_eq!(*request.model(), None);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Default,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into), default)]
pub struct GenerateRequest {
    /// Conversation messages, oldest first
    messages: Vec<Message>,
    /// Maximum tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Model identifier; drivers fall back to their configured model
    model: Option<String>,
}

impl GenerateRequest {
    /// Returns a builder for constructing a GenerateRequest.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// The unified response object.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerateResponse {
    /// Generated outputs, in backend order
    outputs: Vec<Output>,
    /// Token usage, when the backend reports it
    #[builder(default)]
    usage: Option<TokenUsage>,
}

impl GenerateResponse {
    /// Creates a response holding a single text output.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            outputs: vec![Output::Text(content.into())],
            usage: None,
        }
    }

    /// Returns a builder for constructing a GenerateResponse.
    pub fn builder() -> GenerateResponseBuilder {
        GenerateResponseBuilder::default()
    }

    /// Returns the text of the first output, if the backend produced any.
    ///
    /// # Examples
    ///
    /// ```
    /// use coursewright_core::{GenerateResponse, Output};
    ///
    /// assert_eq!(GenerateResponse::text("{}").first_text(), Some("{}"));
    ///
    /// let empty = GenerateResponse::builder().outputs(Vec::<Output>::new()).build().unwrap();
    /// assert_eq!(empty.first_text(), None);
    /// ```
    pub fn first_text(&self) -> Option<&str> {
        self.outputs.first().map(Output::as_text)
    }
}
