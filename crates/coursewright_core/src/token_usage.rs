//! Token usage tracking for generation requests.

use serde::{Deserialize, Serialize};

/// Token usage reported by a backend for one completion.
///
/// # Examples
///
/// ```
/// use coursewright_core::TokenUsage;
///
/// let usage = TokenUsage::new(150, 50, 200);
/// assert_eq!(*usage.input_tokens(), 150);
/// assert_eq!(*usage.total_tokens(), 200);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct TokenUsage {
    /// Number of tokens in the prompt.
    input_tokens: u64,
    /// Number of tokens in the completion.
    output_tokens: u64,
    /// Total tokens consumed (may differ from input + output due to provider accounting).
    total_tokens: u64,
}

impl TokenUsage {
    /// Creates new token usage data.
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}
