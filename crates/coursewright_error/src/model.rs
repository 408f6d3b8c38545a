//! Generation backend error types and retry classification.

/// Backend-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModelErrorKind {
    /// API key not found in configuration or environment
    #[display("API key not set (expected OPENAI_API_KEY)")]
    MissingApiKey,
    /// HTTP/network error before a response was received
    #[display("HTTP error: {}", _0)]
    Http(String),
    /// API returned a non-success status
    #[display("API error (status {}): {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Request could not be expressed for this backend
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
    /// Failed to parse the response body
    #[display("Response parsing failed: {}", _0)]
    ResponseParsing(String),
    /// Builder error
    #[display("Builder error: {}", _0)]
    Builder(String),
}

impl ModelErrorKind {
    /// Check if this error type should be retried at the transport level.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelErrorKind::Http(_) => true,
            ModelErrorKind::Api { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

/// Backend error with source location tracking.
///
/// # Examples
///
/// ```
/// use coursewright_error::{ModelError, ModelErrorKind};
///
/// let err = ModelError::new(ModelErrorKind::MissingApiKey);
/// assert!(format!("{}", err).contains("OPENAI_API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", kind, line, file)]
pub struct ModelError {
    /// The kind of error that occurred
    pub kind: ModelErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use coursewright_error::{ModelError, ModelErrorKind, RetryableError};
///
/// let err = ModelError::new(ModelErrorKind::Api {
///     status: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network timeouts should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ModelError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
