//! Object storage trait.

use nugu_error::NuguResult;

/// Provenance recorded alongside a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_getters::Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct ObjectMetadata {
    /// Original file name or URL
    filename: String,
    /// MIME type of the stored bytes
    mime_type: String,
    /// Channel the object came from
    channel_id: u64,
    /// User who uploaded it
    user_id: u64,
}

/// Blob storage for idol pictures.
///
/// Keys are opaque strings chosen by the implementation.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store bytes and return their key.
    async fn put(&self, data: &[u8], metadata: &ObjectMetadata) -> NuguResult<String>;

    /// Read the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if nothing is stored under `key`.
    async fn get(&self, key: &str) -> NuguResult<Vec<u8>>;

    /// Remove the bytes stored under `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> NuguResult<()>;
}
