//! Wire shapes for TMDB search responses.
//!
//! Detail responses stay as raw JSON; the normalizer owns their shape.

use marquee_core::{MediaKind, parse_year};
use marquee_interface::SearchCandidate;
use serde::Deserialize;

/// One page of search results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    /// Hits on this page
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// One search hit, movie or show.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Provider id
    pub id: u64,
    /// Movie title
    #[serde(default)]
    pub title: Option<String>,
    /// Show name
    #[serde(default)]
    pub name: Option<String>,
    /// Movie release date
    #[serde(default)]
    pub release_date: Option<String>,
    /// Show first air date
    #[serde(default)]
    pub first_air_date: Option<String>,
    /// Poster path relative to the image base
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Popularity score used to merge movie and show results
    #[serde(default)]
    pub popularity: f64,
}

impl SearchHit {
    /// Convert into a candidate, dropping hits with no usable title.
    pub fn into_candidate(self, kind: MediaKind, thumb_base: &str) -> Option<SearchCandidate> {
        let title = self
            .title
            .or(self.name)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())?;
        let year = self
            .release_date
            .or(self.first_air_date)
            .and_then(|date| parse_year(&date.chars().take(4).collect::<String>()));
        let poster_url = self
            .poster_path
            .map(|p| format!("{}/{}", thumb_base.trim_end_matches('/'), p.trim_start_matches('/')));
        Some(SearchCandidate::new(kind, self.id, title, year, poster_url))
    }
}
