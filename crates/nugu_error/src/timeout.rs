//! Timeout error type.

/// A bounded wait expired before input arrived.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Timeout Error: {} at line {} in {}", message, line, file)]
pub struct TimeoutError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TimeoutError {
    /// Create a new TimeoutError at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
