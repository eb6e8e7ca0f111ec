//! The canonical content record.

use serde::{Deserialize, Serialize};

/// Placeholder rendered for absent values that must always appear.
pub const NOT_AVAILABLE: &str = "N/A";

/// Which kind of title a record describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature film
    #[default]
    Movie,
    /// Television series
    #[strum(to_string = "show", serialize = "tv")]
    #[serde(alias = "tv")]
    Show,
}

impl MediaKind {
    /// Path segment the metadata provider uses for this kind.
    pub fn provider_segment(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "tv",
        }
    }
}

/// Where the poster image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PosterSource {
    /// Fetched from a remote URL at render time
    Remote(String),
    /// Raw bytes uploaded by the user
    Uploaded(Vec<u8>),
    /// No poster
    #[default]
    None,
}

/// Canonical description of one title.
///
/// Every generated artifact (caption, markup, poster) is rendered from this
/// record and nothing else.
///
/// # Examples
///
/// ```
/// use marquee_core::{ContentRecord, MediaKind};
///
/// let record = ContentRecord::new("  ", MediaKind::Movie);
/// assert_eq!(record.title, "N/A");
/// assert_eq!(record.year_label(), "----");
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Display title, never empty
    pub title: String,
    /// Movie or show
    pub kind: MediaKind,
    /// Release year
    pub year: Option<u16>,
    /// Average score out of ten
    pub rating: Option<f64>,
    /// Genres in provider order
    pub genres: Vec<String>,
    /// Full synopsis, truncated only at render time
    pub overview: String,
    /// Leading cast members, at most five
    pub cast: Vec<String>,
    /// Director or creator
    pub director: Option<String>,
    /// Audio language chosen by the user
    pub language: Option<String>,
    /// Release quality chosen by the user
    pub quality: Option<String>,
    /// Poster image source
    pub poster: PosterSource,
    /// Wide background image URL
    pub backdrop_url: Option<String>,
    /// Related titles, at most four
    pub similar: Vec<String>,
}

impl ContentRecord {
    /// Maximum cast entries kept on a record.
    pub const MAX_CAST: usize = 5;
    /// Maximum similar titles kept on a record.
    pub const MAX_SIMILAR: usize = 4;

    /// Create an otherwise empty record, substituting `N/A` for a blank title.
    pub fn new(title: impl Into<String>, kind: MediaKind) -> Self {
        let mut record = Self {
            kind,
            ..Self::default()
        };
        record.set_title(title);
        record
    }

    /// Replace the title, keeping the never-empty invariant.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        let trimmed = title.trim();
        self.title = if trimmed.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Year as four digits, or `----` when unknown.
    pub fn year_label(&self) -> String {
        self.year
            .map(|y| format!("{:04}", y))
            .unwrap_or_else(|| "----".to_string())
    }

    /// Rating with one decimal, or `N/A`.
    pub fn rating_label(&self) -> String {
        self.rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Comma separated genres, or `N/A`.
    pub fn genres_label(&self) -> String {
        if self.genres.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.genres.join(", ")
        }
    }

    /// Language if set to something non-blank.
    pub fn language(&self) -> Option<&str> {
        non_blank(self.language.as_deref())
    }

    /// Quality if set to something non-blank.
    pub fn quality(&self) -> Option<&str> {
        non_blank(self.quality.as_deref())
    }

    /// Director if known.
    pub fn director(&self) -> Option<&str> {
        non_blank(self.director.as_deref()).filter(|d| *d != NOT_AVAILABLE)
    }

    /// Filesystem and URL friendly name, e.g. `the-matrix-1999`.
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.title.chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        let slug = if slug.is_empty() { self.kind.as_ref() } else { slug };
        match self.year {
            Some(year) => format!("{}-{}", slug, year),
            None => slug.to_string(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
