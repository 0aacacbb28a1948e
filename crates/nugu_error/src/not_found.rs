//! Not-found error types.

/// What could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NotFoundErrorKind {
    /// No idol matched
    #[display("Idol not found: {}", _0)]
    Idol(String),
    /// No group matched
    #[display("Group not found: {}", _0)]
    Group(String),
    /// No image with the given object name
    #[display("Image not found: {}", _0)]
    Image(String),
    /// Suggestion queue is empty
    #[display("No suggestions in queue")]
    EmptyQueue,
    /// No stored suggestion with this id
    #[display("Suggestion not found: {}", _0)]
    Suggestion(String),
    /// The suggestion was resolved or replaced at the head of the queue
    #[display("Suggestion {} is no longer at the head of the queue", _0)]
    NotAtHead(String),
    /// No starboard entry for the message
    #[display("Starboard entry not found for message {}", _0)]
    StarboardEntry(u64),
    /// Store returned no records where some were required
    #[display("No records found in {}", _0)]
    NoRecords(String),
    /// Object storage has nothing under the key
    #[display("Object not found: {}", _0)]
    Object(String),
}

/// Not-found error with location tracking.
///
/// # Examples
///
/// ```
/// use nugu_error::{NotFoundError, NotFoundErrorKind};
///
/// let err = NotFoundError::new(NotFoundErrorKind::EmptyQueue);
/// assert!(format!("{}", err).contains("No suggestions"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Not Found Error: {} at line {} in {}", kind, line, file)]
pub struct NotFoundError {
    /// The kind of error that occurred
    pub kind: NotFoundErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NotFoundError {
    /// Create a new not-found error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NotFoundErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
