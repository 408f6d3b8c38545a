//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// The author of a chat message.
///
/// Displays in the lowercase form chat-completion APIs expect.
///
/// # Examples
///
/// ```
/// use coursewright_core::Role;
///
/// assert_eq!(Role::System.to_string(), "system");
/// assert_eq!("user".parse::<Role>().unwrap(), Role::User);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}
