//! Image processing error types.

/// Image decoding or encoding error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Image Error: {} at line {} in {}", message, line, file)]
pub struct ImageError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ImageError {
    /// Create a new ImageError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use nugu_error::ImageError;
    ///
    /// let err = ImageError::new("Unexpected end of file");
    /// assert!(err.message.contains("Unexpected end of file"));
    /// ```
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
