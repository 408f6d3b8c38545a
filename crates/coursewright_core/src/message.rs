//! Message types for conversation history.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A text message in a conversation.
///
/// # Examples
///
/// ```
/// use coursewright_core::{Message, Role};
///
/// let message = Message::new(Role::User, "Hello!");
///
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message.content(), "Hello!");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Message {
    /// The role of the message sender
    role: Role,
    /// The text content of the message
    content: String,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Shorthand for a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Shorthand for a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Returns a builder for constructing a Message.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }
}
