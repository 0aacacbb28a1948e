//! Memory/store desync error.
//!
//! Raised when an in-memory idol record and its persisted copy disagree
//! (an image known to one side but not the other). The catalog does not
//! roll back; a full reload reconciles.

/// Memory and store disagree about a record.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Inconsistent State Error: {} at line {} in {}", message, line, file)]
pub struct InconsistentStateError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl InconsistentStateError {
    /// Create a new InconsistentStateError at the current location.
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
