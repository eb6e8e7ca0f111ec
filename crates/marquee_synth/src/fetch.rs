//! HTTP image fetcher.

use async_trait::async_trait;
use marquee_error::{MarqueeResult, RenderError, RenderErrorKind};
use marquee_interface::ImageFetcher;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Downloads images over HTTP with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    /// Create a fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration, max_bytes: usize) -> MarqueeResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RenderError::new(RenderErrorKind::Fetch {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })
        })?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> MarqueeResult<Vec<u8>> {
        let fail = |reason: String| {
            RenderError::new(RenderErrorKind::Fetch {
                url: url.to_string(),
                reason,
            })
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fail(format!("status {}", response.status())).into());
        }
        let bytes = response.bytes().await.map_err(|e| fail(e.to_string()))?;
        if bytes.len() > self.max_bytes {
            return Err(
                fail(format!("{} bytes exceeds limit {}", bytes.len(), self.max_bytes)).into(),
            );
        }
        debug!(bytes = bytes.len(), "Fetched image");
        Ok(bytes.to_vec())
    }
}
