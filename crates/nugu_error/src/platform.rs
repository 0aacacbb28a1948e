//! Chat platform error types.

/// Chat platform error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// API call to the platform failed
    #[display("Platform API error: {_0}")]
    Api(String),

    /// Channel not found by ID.
    #[display("Channel not found: {_0}")]
    ChannelNotFound(u64),

    /// Message not found by ID.
    #[display("Message not found: {_0}")]
    MessageNotFound(u64),

    /// User not found by ID.
    #[display("User not found: {_0}")]
    UserNotFound(u64),

    /// Bot lacks required permissions for an operation.
    #[display("Insufficient permissions: {_0}")]
    InsufficientPermissions(String),

    /// Message failed to send.
    #[display("Message send failed: {_0}")]
    MessageSendFailed(String),

    /// Direct message channel could not be opened.
    #[display("Could not open direct message channel with {_0}")]
    DirectMessage(u64),
}

/// Chat platform error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    /// The kind of error that occurred
    pub kind: PlatformErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new PlatformError with automatic location tracking.
    ///
    /// # Example
    ///
    /// ```
    /// use nugu_error::{PlatformError, PlatformErrorKind};
    ///
    /// let err = PlatformError::new(PlatformErrorKind::ChannelNotFound(42));
    /// assert!(err.to_string().contains("Channel not found: 42"));
    /// ```
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
