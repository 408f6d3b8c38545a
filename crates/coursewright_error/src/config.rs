//! Configuration error types.

/// Ways the layered settings can be unusable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration source could not be read or deserialized
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// A setting holds a value the coercer or client cannot run with
    #[display("Invalid setting `{}`: {}", field, reason)]
    InvalidSetting {
        /// Configuration key
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
    /// The HTTP client settings could not be assembled
    #[display("Invalid client settings: {}", _0)]
    Client(String),
}

/// Configuration error with source location tracking.
///
/// # Examples
///
/// ```
/// use coursewright_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::InvalidSetting {
///     field: "max_tries",
///     reason: "must be at least 1".to_string(),
/// });
/// assert!(format!("{}", err).contains("Invalid setting `max_tries`"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Config Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a rejected setting.
    #[track_caller]
    pub fn invalid_setting(field: &'static str, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidSetting {
            field,
            reason: reason.into(),
        })
    }
}
