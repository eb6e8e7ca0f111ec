//! Paste hosting over HTTP.

use async_trait::async_trait;
use derive_getters::Getters;
use marquee_core::is_http_url;
use marquee_error::{HttpError, MarqueeResult};
use marquee_interface::{PasteOutcome, PasteService};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Paste service endpoint settings.
#[derive(Debug, Clone, Getters, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct PasteConfig {
    /// Endpoint accepting a raw POST body and replying with the paste URL
    #[builder(default = "default_endpoint()")]
    #[serde(default = "default_endpoint")]
    endpoint: String,
    /// Request timeout in seconds
    #[builder(default = "default_timeout_secs()")]
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://paste.rs/".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Publishes HTML to a paste.rs style service.
#[derive(Debug, Clone)]
pub struct HttpPasteService {
    client: Client,
    endpoint: String,
}

impl HttpPasteService {
    /// Create the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &PasteConfig) -> MarqueeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PasteService for HttpPasteService {
    #[instrument(skip(self, html), fields(endpoint = %self.endpoint, bytes = html.len()))]
    async fn publish(&self, html: &str) -> PasteOutcome {
        let response = match self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(html.to_string())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Paste request failed");
                return PasteOutcome::Failed(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Paste response unreadable");
                return PasteOutcome::Failed(e.to_string());
            }
        };

        let url = body.trim();
        if status.is_success() && is_http_url(url) {
            info!(url = %url, "HTML pasted");
            PasteOutcome::Published(url.to_string())
        } else {
            warn!(status = %status, "Paste service refused upload");
            PasteOutcome::Failed(format!("status {}: {}", status, url))
        }
    }
}
