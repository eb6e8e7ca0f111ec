//! Download link entries.

use crate::validation::is_http_url;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Rejected link URL.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Not an http(s) URL: {}", _0)]
pub struct InvalidLink(pub String);

impl std::error::Error for InvalidLink {}

/// One labelled download link.
///
/// The URL always starts with `http://` or `https://`; the only constructor
/// checks it.
///
/// # Examples
///
/// ```
/// use marquee_core::LinkEntry;
///
/// assert!(LinkEntry::new("720p", "https://x").is_ok());
/// assert!(LinkEntry::new("720p", "ftp://x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize)]
pub struct LinkEntry {
    /// Button text
    label: String,
    /// Target URL
    url: String,
}

impl LinkEntry {
    /// Validate and build a link. A blank label becomes `Download`.
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Result<Self, InvalidLink> {
        let url = url.into().trim().to_string();
        if !is_http_url(&url) {
            return Err(InvalidLink(url));
        }
        let label = label.into().trim().to_string();
        let label = if label.is_empty() {
            "Download".to_string()
        } else {
            label
        };
        Ok(Self { label, url })
    }
}

impl<'de> Deserialize<'de> for LinkEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            label: String,
            url: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        LinkEntry::new(raw.label, raw.url).map_err(serde::de::Error::custom)
    }
}
