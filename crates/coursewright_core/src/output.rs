//! Output types from generation responses.

use serde::{Deserialize, Serialize};

/// Supported output types from generation backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text completion.
    Text(String),
}

impl Output {
    /// Returns the output as text.
    pub fn as_text(&self) -> &str {
        match self {
            Output::Text(text) => text,
        }
    }
}
