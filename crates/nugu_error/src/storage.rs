//! Object storage error types.

/// Kinds of object storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write object
    #[display("Failed to write object: {}", _0)]
    Write(String),
    /// Failed to read object
    #[display("Failed to read object: {}", _0)]
    Read(String),
    /// Failed to delete object
    #[display("Failed to delete object: {}", _0)]
    Delete(String),
    /// Object key is not a valid storage key
    #[display("Invalid object key: {}", _0)]
    InvalidKey(String),
    /// Storage backend is unavailable
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
}

/// Object storage error with location tracking.
///
/// # Examples
///
/// ```
/// use nugu_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::InvalidKey("../etc".to_string()));
/// assert!(format!("{}", err).contains("Invalid object key"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
