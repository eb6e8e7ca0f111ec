//! Provider record normalization.
//!
//! Provider payloads differ between movies and shows (`title` vs `name`,
//! `release_date` vs `first_air_date`, crew vs `created_by`). All of that
//! unification happens here and nowhere else.

use crate::{ContentRecord, MediaKind, PosterSource};
use serde_json::Value;
use tracing::{debug, instrument};

/// Default prefix joined with provider poster paths.
pub const DEFAULT_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
/// Default prefix joined with provider backdrop paths.
pub const DEFAULT_BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/w1280";

/// Maps raw provider records onto [`ContentRecord`].
///
/// Normalization never fails: missing or malformed fields fall back to
/// `None`, empty lists or `N/A`.
///
/// # Examples
///
/// ```
/// use marquee_core::{MediaKind, MetadataNormalizer};
/// use serde_json::json;
///
/// let raw = json!({"name": "Dark", "first_air_date": "2017-12-01"});
/// let record = MetadataNormalizer::default().normalize(&raw, MediaKind::Show);
/// assert_eq!(record.title, "Dark");
/// assert_eq!(record.year, Some(2017));
/// ```
#[derive(Debug, Clone)]
pub struct MetadataNormalizer {
    poster_base: String,
    backdrop_base: String,
}

impl Default for MetadataNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_POSTER_BASE, DEFAULT_BACKDROP_BASE)
    }
}

impl MetadataNormalizer {
    /// Create a normalizer joining image paths onto the given bases.
    pub fn new(poster_base: impl Into<String>, backdrop_base: impl Into<String>) -> Self {
        Self {
            poster_base: poster_base.into().trim_end_matches('/').to_string(),
            backdrop_base: backdrop_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Normalize one provider record.
    #[instrument(skip(self, raw), fields(kind = %kind))]
    pub fn normalize(&self, raw: &Value, kind: MediaKind) -> ContentRecord {
        let title = first_str(raw, &["title", "name"]).unwrap_or_default();
        let mut record = ContentRecord::new(title, kind);

        record.year = first_str(raw, &["release_date", "first_air_date"]).and_then(year_prefix);
        record.rating = raw.get("vote_average").and_then(Value::as_f64);
        record.genres = names(raw.get("genres"), &["name"]);
        record.overview = str_at(raw, "overview").unwrap_or_default().to_string();
        record.cast = names(raw.pointer("/credits/cast"), &["name"])
            .into_iter()
            .take(ContentRecord::MAX_CAST)
            .collect();
        record.director = director(raw);
        record.similar = names(raw.pointer("/similar/results"), &["title", "name"])
            .into_iter()
            .take(ContentRecord::MAX_SIMILAR)
            .collect();
        record.poster = match str_at(raw, "poster_path") {
            Some(path) => PosterSource::Remote(self.join(&self.poster_base, path)),
            None => PosterSource::None,
        };
        record.backdrop_url =
            str_at(raw, "backdrop_path").map(|p| self.join(&self.backdrop_base, p));

        debug!(
            title = %record.title,
            year = ?record.year,
            cast = record.cast.len(),
            similar = record.similar.len(),
            "Normalized provider record"
        );
        record
    }

    fn join(&self, base: &str, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        }
    }
}

fn str_at<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_str<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| str_at(raw, key))
}

fn year_prefix(date: &str) -> Option<u16> {
    let prefix: String = date.chars().take(4).collect();
    crate::parse_year(&prefix)
}

/// Collect the first non-empty string under any of `keys` for each array entry.
fn names(list: Option<&Value>, keys: &[&str]) -> Vec<String> {
    list.and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| first_str(entry, keys))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn director(raw: &Value) -> Option<String> {
    let from_crew = raw
        .pointer("/credits/crew")
        .and_then(Value::as_array)
        .and_then(|crew| {
            crew.iter()
                .find(|member| member.get("job").and_then(Value::as_str) == Some("Director"))
        })
        .and_then(|member| str_at(member, "name"));

    from_crew
        .or_else(|| {
            raw.get("created_by")
                .and_then(Value::as_array)
                .and_then(|creators| creators.iter().find_map(|c| str_at(c, "name")))
        })
        .map(str::to_string)
}
