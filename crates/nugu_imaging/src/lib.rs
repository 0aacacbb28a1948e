//! Perceptual hashing and validation of idol pictures.
//!
//! Submitted pictures are decoded once, checked against the size rules,
//! hashed for duplicate detection and resized before they are stored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod hash;
mod process;

pub use hash::{DifferenceHasher, ImageHasher};
pub use process::{ImageRules, check_content_type, decode, encode_png, resize_to_height};
