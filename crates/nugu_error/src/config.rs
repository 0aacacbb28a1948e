//! Startup configuration errors.

/// Bad or missing settings in the config file, `NUGU_*` variables or
/// logging setup. Never shown to chat users.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Which setting was wrong and why
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Record a configuration problem at the caller's location.
    ///
    /// ```
    /// use nugu_error::{ConfigError, NuguError};
    ///
    /// let err: NuguError = ConfigError::new("discord.token is empty, set NUGU_DISCORD__TOKEN").into();
    /// assert!(!err.is_user_facing());
    /// assert!(err.to_string().contains("NUGU_DISCORD__TOKEN"));
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
