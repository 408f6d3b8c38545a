//! Error types for the Coursewright library.
//!
//! Every error records the file and line where it was created. Crate-level
//! errors are gathered into [`CoursewrightError`], which any of them converts
//! into with `?`.

mod coerce;
mod config;
mod model;

pub use coerce::{CoerceError, CoerceErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use model::{ModelError, ModelErrorKind, RetryableError};

/// All error conditions in the Coursewright ecosystem.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum CoursewrightErrorKind {
    /// Configuration failure
    #[display("{}", _0)]
    Config(ConfigError),
    /// Generation backend failure
    #[display("{}", _0)]
    Model(ModelError),
    /// Structured output failure
    #[display("{}", _0)]
    Coerce(CoerceError),
}

/// Coursewright error with boxed kind.
///
/// # Examples
///
/// ```
/// use coursewright_error::{ConfigError, ConfigErrorKind, CoursewrightError, CoursewrightErrorKind};
///
/// let err: CoursewrightError = ConfigError::new(ConfigErrorKind::Load("no such file".into())).into();
/// assert!(matches!(err.kind(), CoursewrightErrorKind::Config(_)));
/// assert!(matches!(err.config_kind(), Some(ConfigErrorKind::Load(_))));
/// ```
#[derive(Debug)]
pub struct CoursewrightError(Box<CoursewrightErrorKind>);

impl CoursewrightError {
    /// Create a new error from a kind.
    pub fn new(kind: CoursewrightErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Borrow the underlying kind.
    pub fn kind(&self) -> &CoursewrightErrorKind {
        &self.0
    }

    /// Returns the configuration error kind, if this is a configuration error.
    pub fn config_kind(&self) -> Option<&ConfigErrorKind> {
        match self.kind() {
            CoursewrightErrorKind::Config(e) => Some(&e.kind),
            _ => None,
        }
    }

    /// Returns the coercion error kind, if this is a coercion error.
    pub fn coerce_kind(&self) -> Option<&CoerceErrorKind> {
        match self.kind() {
            CoursewrightErrorKind::Coerce(e) => Some(&e.kind),
            _ => None,
        }
    }
}

impl std::fmt::Display for CoursewrightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Coursewright Error: {}", self.0)
    }
}

impl std::error::Error for CoursewrightError {}

// Generic From implementation for any type that converts to CoursewrightErrorKind
impl<T> From<T> for CoursewrightError
where
    T: Into<CoursewrightErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Coursewright operations.
pub type CoursewrightResult<T> = std::result::Result<T, CoursewrightError>;
