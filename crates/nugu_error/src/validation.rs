//! Validation error types.
//!
//! Validation failures are reported back to the user verbatim and never
//! change any state.

/// Kinds of input validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Gender was not `boy` or `girl`
    #[display("Invalid gender '{}'. Gender must be exactly 'girl' or 'boy'.", _0)]
    InvalidGender(String),
    /// Image is not square
    #[display("Image must be square ({}x{} given).", _0, _1)]
    NotSquare(u32, u32),
    /// Image side length outside the accepted range
    #[display("Image sides must be between {} and {} pixels ({} given).", _0, _1, _2)]
    InvalidDimensions(u32, u32, u32),
    /// Content type is not PNG or JPEG
    #[display("Image must be a PNG or JPEG (got '{}').", _0)]
    UnsupportedContentType(String),
    /// URL missing or could not be fetched as an image
    #[display("Invalid image url: {}", _0)]
    InvalidUrl(String),
    /// Group or idol name contains a forbidden character
    #[display("Group and idol names may not contain '\"' or '_'.")]
    InvalidCharacters,
    /// Image matches one already in the game
    #[display("That image already exists in the game.")]
    ImageExists,
    /// Image matches one already waiting in the queue
    #[display("That image has already been suggested.")]
    ImageAlreadySuggested,
    /// Command arguments could not be interpreted
    #[display("Invalid arguments: {}", _0)]
    InvalidArguments(String),
    /// A denial needs notes or a predefined reason
    #[display(
        "A note must be set before denying a suggestion. Please use: `s-edit notes {{reason for denial...}}`"
    )]
    MissingDenialNotes,
    /// Denial reason code outside the predefined list
    #[display("Unknown denial reason: {}", _0)]
    UnknownDenialReason(usize),
    /// Field name not editable on a suggestion
    #[display("Unknown suggestion field: {}", _0)]
    UnknownField(String),
    /// Starboard minimum below one
    #[display("Minimum must be at least 1 (got {}).", _0)]
    InvalidMinimum(i64),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use nugu_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::ImageExists);
/// assert!(format!("{}", err).contains("already exists"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
