//! Error types for the nugu idol bot.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind with source location tracking
//! - constructors use `#[track_caller]` to capture the location
//!
//! # Examples
//!
//! ```
//! use nugu_error::{NuguResult, ValidationError, ValidationErrorKind};
//!
//! fn check_gender(gender: &str) -> NuguResult<()> {
//!     if gender != "boy" && gender != "girl" {
//!         Err(ValidationError::new(ValidationErrorKind::InvalidGender(gender.to_string())))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_gender("girl").is_ok());
//! assert!(check_gender("cat").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod image;
mod inconsistent;
mod not_found;
mod platform;
mod storage;
mod store;
mod timeout;
mod validation;

pub use config::ConfigError;
pub use error::{NuguError, NuguErrorKind, NuguResult};
pub use http::HttpError;
pub use image::ImageError;
pub use inconsistent::InconsistentStateError;
pub use not_found::{NotFoundError, NotFoundErrorKind};
pub use platform::{PlatformError, PlatformErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use store::{StoreError, StoreErrorKind};
pub use timeout::TimeoutError;
pub use validation::{ValidationError, ValidationErrorKind};
