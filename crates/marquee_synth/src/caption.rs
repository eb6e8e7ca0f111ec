//! Plain text caption.

use derive_getters::Getters;
use marquee_core::{ContentRecord, LinkEntry, MediaKind};
use serde::Deserialize;

/// Appended to a plot that was cut short.
pub const PLOT_ELLIPSIS: &str = "...";

/// Caption rendering switches.
#[derive(Debug, Clone, Getters, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct CaptionOptions {
    /// Maximum plot characters before truncation
    #[builder(default = "default_plot_limit()")]
    #[serde(default = "default_plot_limit")]
    plot_limit: usize,
    /// Include the similar titles list
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    similar: bool,
    /// Include the download links list
    #[builder(default = "false")]
    #[serde(default)]
    links: bool,
    /// Closing line, e.g. a promo channel mention
    #[builder(default)]
    #[serde(default)]
    footer: Option<String>,
}

fn default_plot_limit() -> usize {
    450
}

fn default_true() -> bool {
    true
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            plot_limit: default_plot_limit(),
            similar: true,
            links: false,
            footer: None,
        }
    }
}

impl CaptionOptions {
    /// Same options with a different footer.
    pub fn with_footer(mut self, footer: Option<String>) -> Self {
        self.footer = footer;
        self
    }
}

/// Cut `overview` to `limit` characters, appending [`PLOT_ELLIPSIS`] only
/// when something was removed.
///
/// # Examples
///
/// ```
/// use marquee_synth::truncate_plot;
///
/// assert_eq!(truncate_plot("short", 10), "short");
/// assert_eq!(truncate_plot("abcdefghij", 4), "abcd...");
/// ```
pub fn truncate_plot(overview: &str, limit: usize) -> String {
    let overview = overview.trim();
    if overview.chars().count() <= limit {
        return overview.to_string();
    }
    let mut cut: String = overview.chars().take(limit).collect();
    let kept = cut.trim_end().len();
    cut.truncate(kept);
    cut.push_str(PLOT_ELLIPSIS);
    cut
}

/// Render the chat caption.
///
/// Section order is fixed: header, rating, genres, language, quality,
/// director, cast, plot, similar titles, links, footer. Rating and genres
/// always appear (with `N/A`); the rest are left out when empty.
pub fn render_caption(
    record: &ContentRecord,
    links: &[LinkEntry],
    options: &CaptionOptions,
) -> String {
    let icon = match record.kind {
        MediaKind::Movie => "🎬",
        MediaKind::Show => "📺",
    };
    let mut lines = vec![
        format!("{} {} ({})", icon, record.title, record.year_label()),
        String::new(),
    ];

    lines.push(match record.rating {
        Some(_) => format!("⭐ Rating: {}/10", record.rating_label()),
        None => format!("⭐ Rating: {}", record.rating_label()),
    });
    lines.push(format!("🎭 Genres: {}", record.genres_label()));
    if let Some(language) = record.language() {
        lines.push(format!("🔊 Language: {}", language));
    }
    if let Some(quality) = record.quality() {
        lines.push(format!("💿 Quality: {}", quality));
    }
    if let Some(director) = record.director() {
        lines.push(format!("🎥 Director: {}", director));
    }
    if !record.cast.is_empty() {
        let cast: Vec<&str> = record
            .cast
            .iter()
            .take(ContentRecord::MAX_CAST)
            .map(String::as_str)
            .collect();
        lines.push(format!("👥 Cast: {}", cast.join(", ")));
    }

    if !record.overview.trim().is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "📖 Plot: {}",
            truncate_plot(&record.overview, options.plot_limit)
        ));
    }

    if options.similar && !record.similar.is_empty() {
        lines.push(String::new());
        lines.push("🍿 Similar Titles:".to_string());
        lines.extend(
            record
                .similar
                .iter()
                .take(ContentRecord::MAX_SIMILAR)
                .map(|title| format!("• {}", title)),
        );
    }

    if options.links && !links.is_empty() {
        lines.push(String::new());
        lines.push("🔗 Download Links:".to_string());
        lines.extend(
            links
                .iter()
                .map(|link| format!("• {}: {}", link.label(), link.url())),
        );
    }

    if let Some(footer) = options
        .footer
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
    {
        lines.push(String::new());
        lines.push(footer.to_string());
    }

    lines.join("\n")
}
