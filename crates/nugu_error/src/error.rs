//! Top-level error wrapper types.

use crate::{
    ConfigError, HttpError, ImageError, InconsistentStateError, NotFoundError,
    PlatformError, StorageError, StoreError, TimeoutError, ValidationError,
};

/// Every error condition the bot can produce.
///
/// # Examples
///
/// ```
/// use nugu_error::{NuguError, HttpError};
///
/// let http_err = HttpError::status(403, "https://x/yeji.png");
/// let err: NuguError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum NuguErrorKind {
    /// Input rejected before any state change
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Referenced entity does not exist
    #[from(NotFoundError)]
    NotFound(NotFoundError),
    /// Document store failure
    #[from(StoreError)]
    Store(StoreError),
    /// Object storage failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Chat platform failure
    #[from(PlatformError)]
    Platform(PlatformError),
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Image decode/encode error
    #[from(ImageError)]
    Image(ImageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Bounded wait expired
    #[from(TimeoutError)]
    Timeout(TimeoutError),
    /// Memory and store disagree
    #[from(InconsistentStateError)]
    InconsistentState(InconsistentStateError),
}

/// Nugu error with kind discrimination.
///
/// # Examples
///
/// ```
/// use nugu_error::{NuguResult, ConfigError};
///
/// fn might_fail() -> NuguResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Nugu Error: {}", _0)]
pub struct NuguError(Box<NuguErrorKind>);

impl NuguError {
    /// Create a new error from a kind.
    pub fn new(kind: NuguErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &NuguErrorKind {
        &self.0
    }

    /// Whether the error is caused by user input rather than a failing collaborator.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.kind(),
            NuguErrorKind::Validation(_) | NuguErrorKind::NotFound(_) | NuguErrorKind::Timeout(_)
        )
    }

    /// Text suitable for a chat reply.
    ///
    /// User-facing errors show their kind; everything else collapses to a
    /// generic failure so internals are not leaked into the channel.
    ///
    /// ```
    /// use nugu_error::{NuguError, ValidationError, ValidationErrorKind, StoreError, StoreErrorKind};
    ///
    /// let err: NuguError = ValidationError::new(ValidationErrorKind::ImageExists).into();
    /// assert_eq!(err.user_message(), "That image already exists in the game.");
    ///
    /// let err: NuguError = StoreError::new(StoreErrorKind::NotFound).into();
    /// assert_eq!(err.user_message(), "Something went wrong, please try again later.");
    /// ```
    pub fn user_message(&self) -> String {
        match self.kind() {
            NuguErrorKind::Validation(e) => e.kind.to_string(),
            NuguErrorKind::NotFound(e) => e.kind.to_string(),
            NuguErrorKind::Timeout(_) => "Timed out waiting for a response.".to_string(),
            _ => "Something went wrong, please try again later.".to_string(),
        }
    }
}

impl<T> From<T> for NuguError
where
    T: Into<NuguErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for nugu operations.
pub type NuguResult<T> = std::result::Result<T, NuguError>;
