//! Collaborator traits.

use crate::Outbound;
use async_trait::async_trait;
use derive_getters::Getters;
use marquee_core::MediaKind;
use marquee_error::MarqueeResult;
use serde::{Deserialize, Serialize};

/// One search hit from the metadata provider.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Movie or show
    kind: MediaKind,
    /// Provider id
    id: u64,
    /// Display title
    title: String,
    /// Release year if known
    year: Option<u16>,
    /// Provider poster URL for inline previews
    poster_url: Option<String>,
}

impl SearchCandidate {
    /// Create a candidate.
    pub fn new(
        kind: MediaKind,
        id: u64,
        title: impl Into<String>,
        year: Option<u16>,
        poster_url: Option<String>,
    ) -> Self {
        Self {
            kind,
            id,
            title: title.into(),
            year,
            poster_url,
        }
    }

    /// `Title (Year)` label for buttons and inline results.
    pub fn label(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// Read-only metadata lookups.
///
/// Implementations swallow network and decoding failures: a failed search is
/// an empty list, failed details are `None`.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Top candidates for a free-text query, optionally filtered by year.
    async fn search(&self, query: &str, year: Option<u16>) -> Vec<SearchCandidate>;

    /// Enriched raw record (credits, crew, similar titles) for one title.
    async fn details(&self, kind: MediaKind, id: u64) -> Option<serde_json::Value>;
}

/// Downloads image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw bytes at `url`.
    async fn fetch(&self, url: &str) -> MarqueeResult<Vec<u8>>;
}

/// Result of handing HTML to the paste collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Hosted at the given URL
    Published(String),
    /// Not hosted; the reason is shown to the user
    Failed(String),
}

/// Best-effort hosting for long HTML.
#[async_trait]
pub trait PasteService: Send + Sync {
    /// Host `html` and return where it lives.
    async fn publish(&self, html: &str) -> PasteOutcome;
}

/// Delivers outbound intents to the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Perform one intent.
    async fn deliver(&self, intent: Outbound) -> MarqueeResult<()>;
}
