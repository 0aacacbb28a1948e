//! Outbound image download.

use nugu_error::NuguResult;

/// Body and content type of a downloaded image.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct FetchedImage {
    content_type: String,
    bytes: Vec<u8>,
}

impl FetchedImage {
    /// Wrap a response body.
    pub fn new(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Take ownership of the body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Downloads submitted images.
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    /// GET `url`, returning the `Content-Type` header and the body.
    async fn fetch(&self, url: &str) -> NuguResult<FetchedImage>;
}
