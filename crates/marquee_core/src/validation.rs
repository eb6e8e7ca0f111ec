//! Validation rules for user-typed values.

use regex::Regex;
use std::sync::LazyLock;

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("http url regex should compile"));

/// Whether `value` is an absolute `http://` or `https://` URL.
pub fn is_http_url(value: &str) -> bool {
    HTTP_URL.is_match(value.trim())
}

/// Parse a year typed by the user; exactly four ASCII digits.
///
/// # Examples
///
/// ```
/// use marquee_core::parse_year;
///
/// assert_eq!(parse_year("2023"), Some(2023));
/// assert_eq!(parse_year("23"), None);
/// assert_eq!(parse_year("20x3"), None);
/// ```
pub fn parse_year(value: &str) -> Option<u16> {
    let value = value.trim();
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}

/// A rating the user typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingInput {
    /// Numeric score
    Score(f64),
    /// Explicit "N/A"
    NotAvailable,
}

impl RatingInput {
    /// As an optional score.
    pub fn into_option(self) -> Option<f64> {
        match self {
            Self::Score(score) => Some(score),
            Self::NotAvailable => None,
        }
    }
}

/// Parse a rating: a finite float or `N/A` in any case.
pub fn parse_rating(value: &str) -> Option<RatingInput> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("n/a") {
        return Some(RatingInput::NotAvailable);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|score| score.is_finite())
        .map(RatingInput::Score)
}

/// Split a comma separated genre list, dropping blanks.
pub fn parse_genres(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the user asked to skip an optional step.
pub fn is_skip(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "skip" | "-" | "none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_schemes() {
        assert!(is_http_url("https://x"));
        assert!(is_http_url("http://example.com/file.mkv"));
        assert!(!is_http_url("ftp://x"));
        assert!(!is_http_url("not a url"));
        assert!(!is_http_url("https://"));
    }

    #[test]
    fn test_rating_forms() {
        assert_eq!(parse_rating("7.5"), Some(RatingInput::Score(7.5)));
        assert_eq!(parse_rating("n/A"), Some(RatingInput::NotAvailable));
        assert_eq!(parse_rating("great"), None);
        assert_eq!(parse_rating("NaN"), None);
    }

    #[test]
    fn test_genres_split() {
        assert_eq!(parse_genres("Action, ,Drama "), vec!["Action", "Drama"]);
    }
}
