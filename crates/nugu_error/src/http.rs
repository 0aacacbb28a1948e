//! Picture download errors.

/// Failed download of a suggested picture.
///
/// `status` is set when the image host answered with a non-success code,
/// and left empty for transport failures.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// What went wrong
    pub message: String,
    /// Status returned by the image host
    pub status: Option<u16>,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a transport-level error at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use nugu_error::HttpError;
    ///
    /// let err = HttpError::new("Request to cdn.example timed out");
    /// assert_eq!(err.status, None);
    /// assert!(err.to_string().starts_with("HTTP Error: Request to cdn.example"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            status: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create an error for a non-success response.
    ///
    /// ```
    /// use nugu_error::HttpError;
    ///
    /// let err = HttpError::status(404, "https://x/irene.png");
    /// assert_eq!(err.status, Some(404));
    /// assert!(err.message.contains("irene.png"));
    /// ```
    #[track_caller]
    pub fn status(status: u16, url: &str) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: format!("Image host returned {} for {}", status, url),
            status: Some(status),
            line: location.line(),
            file: location.file(),
        }
    }
}
