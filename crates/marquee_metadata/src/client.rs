//! TMDB HTTP client.

use crate::dto::{SearchHit, SearchPage};
use async_trait::async_trait;
use derive_getters::Getters;
use marquee_core::MediaKind;
use marquee_error::{HttpError, MarqueeResult};
use marquee_interface::{MetadataProvider, SearchCandidate};
use reqwest::Client;
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connection settings for [`TmdbClient`].
#[derive(Debug, Clone, Getters, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct TmdbConfig {
    /// API key (v3), usually supplied from the environment
    #[builder(default)]
    #[serde(default)]
    api_key: String,
    /// API root
    #[builder(default = "default_base_url()")]
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Image base used for search thumbnails
    #[builder(default = "default_thumb_base()")]
    #[serde(default = "default_thumb_base")]
    thumb_base: String,
    /// How many candidates a search returns
    #[builder(default = "default_results_limit()")]
    #[serde(default = "default_results_limit")]
    results_limit: usize,
    /// Per-request timeout in seconds
    #[builder(default = "default_timeout_secs()")]
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_thumb_base() -> String {
    "https://image.tmdb.org/t/p/w92".to_string()
}

fn default_results_limit() -> usize {
    8
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            thumb_base: default_thumb_base(),
            results_limit: default_results_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TmdbConfig {
    /// Same settings with a different API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

/// TMDB metadata provider.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    config: TmdbConfig,
}

impl TmdbClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip_all)]
    pub fn new(config: TmdbConfig) -> MarqueeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build TMDB client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> MarqueeResult<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(url = %url, "Sending TMDB request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::new(format!("TMDB returned {}: {}", status, body)).into());
        }

        Ok(response
            .json()
            .await
            .map_err(|e| HttpError::new(format!("Failed to parse response: {}", e)))?)
    }

    async fn search_kind(&self, kind: MediaKind, query: &str, year: Option<u16>) -> Vec<SearchHit> {
        let mut params = vec![
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(year) = year {
            let key = match kind {
                MediaKind::Movie => "year",
                MediaKind::Show => "first_air_date_year",
            };
            params.push((key, year.to_string()));
        }

        let path = format!("search/{}", kind.provider_segment());
        match self.get_json::<SearchPage>(&path, &params).await {
            Ok(page) => page.results,
            Err(e) => {
                warn!(kind = %kind, error = %e, "TMDB search failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    #[instrument(skip(self), fields(limit = self.config.results_limit))]
    async fn search(&self, query: &str, year: Option<u16>) -> Vec<SearchCandidate> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let (movies, shows) = futures::join!(
            self.search_kind(MediaKind::Movie, query, year),
            self.search_kind(MediaKind::Show, query, year),
        );

        let candidates = merge_by_popularity(movies, shows, self.config.results_limit)
            .into_iter()
            .filter_map(|(kind, hit)| hit.into_candidate(kind, &self.config.thumb_base))
            .collect::<Vec<_>>();
        debug!(count = candidates.len(), "Search finished");
        candidates
    }

    #[instrument(skip(self))]
    async fn details(&self, kind: MediaKind, id: u64) -> Option<serde_json::Value> {
        let path = format!("{}/{}", kind.provider_segment(), id);
        let params = [("append_to_response", "credits,similar".to_string())];
        match self.get_json(&path, &params).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "TMDB detail lookup failed");
                None
            }
        }
    }
}

/// Merge movie and show hits, most popular first, keeping at most `limit`.
fn merge_by_popularity(
    movies: Vec<SearchHit>,
    shows: Vec<SearchHit>,
    limit: usize,
) -> Vec<(MediaKind, SearchHit)> {
    let mut merged: Vec<(MediaKind, SearchHit)> = movies
        .into_iter()
        .map(|hit| (MediaKind::Movie, hit))
        .chain(shows.into_iter().map(|hit| (MediaKind::Show, hit)))
        .collect();
    // Stable sort keeps provider order among equal scores.
    merged.sort_by(|a, b| {
        b.1.popularity
            .partial_cmp(&a.1.popularity)
            .unwrap_or(Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}
