//! Structured output coercion error types.

/// Error conditions raised by the structured output coercer.
///
/// Malformed JSON and missing fields never surface here: they are retried
/// inside the attempt loop. These kinds cover caller mistakes and the
/// strict-mode exhaustion signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CoerceErrorKind {
    /// The generation request is malformed (empty prompts, empty spec, zero tries)
    #[display("Invalid generation request: {}", _0)]
    InvalidRequest(String),
    /// Every attempt produced output that failed to parse or validate
    #[display("No valid output after {} attempt(s); last error: {}", attempts, last_error)]
    Exhausted {
        /// Number of attempts made
        attempts: usize,
        /// Error message from the final attempt
        last_error: String,
    },
    /// Validated output did not match the caller's target type
    #[display("Failed to deserialize generated output: {}", _0)]
    Deserialize(String),
    /// An output spec could not be parsed
    #[display("Invalid output spec: {}", _0)]
    InvalidSpec(String),
}

/// Coercion error with source location tracking.
///
/// # Examples
///
/// ```
/// use coursewright_error::{CoerceError, CoerceErrorKind};
///
/// let err = CoerceError::new(CoerceErrorKind::Exhausted {
///     attempts: 3,
///     last_error: "title not in json output".to_string(),
/// });
/// assert!(format!("{}", err).contains("3 attempt"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Coerce Error: {} at line {} in {}", kind, line, file)]
pub struct CoerceError {
    /// The kind of error that occurred
    pub kind: CoerceErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CoerceError {
    /// Create a new CoerceError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CoerceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
