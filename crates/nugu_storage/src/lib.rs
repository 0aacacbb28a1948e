//! Object storage backends for idol pictures.
//!
//! Provides [`FileSystemStorage`] for production use and [`MemoryStorage`]
//! for tests and ephemeral runs. Both implement
//! [`nugu_interface::ObjectStorage`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;

pub use filesystem::FileSystemStorage;
pub use memory::MemoryStorage;
