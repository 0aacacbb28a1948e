//! HTTP download of suggested pictures.

use nugu_error::{HttpError, NuguResult};
use nugu_interface::{FetchedImage, ImageFetcher};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Largest body accepted, a little above a 2000x2000 PNG.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// [`ImageFetcher`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> NuguResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nugu/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> NuguResult<FetchedImage> {
        let response = self.client.get(url).send().await.map_err(|e| {
            debug!(error = %e, "Image request failed");
            HttpError::new(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "Image host returned an error");
            Err(HttpError::status(status.as_u16(), url))?
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read image body");
            HttpError::new(format!("Failed to read body: {}", e))
        })?;
        if bytes.len() > MAX_BODY_BYTES {
            Err(HttpError::new(format!(
                "Image body of {} bytes exceeds the limit",
                bytes.len()
            )))?
        }

        debug!(content_type = %content_type, bytes = bytes.len(), "Fetched image");
        Ok(FetchedImage::new(content_type, bytes.to_vec()))
    }
}
