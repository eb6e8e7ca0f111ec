//! Blog HTML snippet.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use marquee_core::{ContentRecord, LinkEntry, PosterSource};
use marquee_error::{MarqueeResult, RenderError, RenderErrorKind};
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TEMPLATE_NAME: &str = "post.html";
const TEMPLATE: &str = include_str!("../templates/post.html");

/// CSS class carried by every download anchor, and nothing else.
pub const DOWNLOAD_ANCHOR_CLASS: &str = "dl-link";
/// CSS class of the placeholder shown when there are no links.
pub const NO_LINKS_CLASS: &str = "no-links";

/// Settings for the two-stage "ad, then countdown" download gate.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GateOptions {
    /// Opened on the first press of a download control
    #[builder(default)]
    #[serde(default)]
    ad_url: String,
    /// Seconds between the second press and the link appearing
    #[builder(default = "default_countdown()")]
    #[serde(default = "default_countdown")]
    countdown_secs: u32,
    /// Starting value of the unlock counter
    #[builder(default = "default_counter_seed()")]
    #[serde(default = "default_counter_seed")]
    counter_seed: u64,
}

fn default_countdown() -> u32 {
    10
}

fn default_counter_seed() -> u64 {
    1000
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            ad_url: String::new(),
            countdown_secs: default_countdown(),
            counter_seed: default_counter_seed(),
        }
    }
}

impl GateOptions {
    /// Same gate with a different ad destination.
    pub fn with_ad_url(mut self, ad_url: impl Into<String>) -> Self {
        self.ad_url = ad_url.into();
        self
    }
}

/// HTML rendering switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct HtmlOptions {
    /// Wrap downloads in the gate script
    #[builder(default)]
    #[serde(default)]
    gate: Option<GateOptions>,
}

impl HtmlOptions {
    /// Options without a gate.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Options with the given gate.
    pub fn gated(gate: GateOptions) -> Self {
        Self { gate: Some(gate) }
    }
}

#[derive(Serialize)]
struct LinkView<'a> {
    label: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct PostView<'a> {
    title: &'a str,
    year: String,
    rating: String,
    genres: String,
    language: Option<&'a str>,
    quality: Option<&'a str>,
    director: Option<&'a str>,
    overview: &'a str,
    poster_src: Option<String>,
    backdrop_url: Option<&'a str>,
    cast: &'a [String],
    links: Vec<LinkView<'a>>,
    gate: Option<&'a GateOptions>,
}

/// Poster `src`: the remote URL, or a data URI for uploaded bytes.
fn poster_src(poster: &PosterSource) -> Option<String> {
    match poster {
        PosterSource::Remote(url) => Some(url.clone()),
        PosterSource::Uploaded(bytes) => {
            let mime = image::guess_format(bytes)
                .map(|format| format.to_mime_type())
                .unwrap_or("image/jpeg");
            Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
        }
        PosterSource::None => None,
    }
}

/// Render the self-contained HTML snippet.
///
/// The output holds one `dl-link` anchor per link, or the `no-links`
/// placeholder when `links` is empty. User text is HTML-escaped.
///
/// # Errors
///
/// Returns a template error if the embedded template fails to render.
pub fn render_html(
    record: &ContentRecord,
    links: &[LinkEntry],
    options: &HtmlOptions,
) -> MarqueeResult<String> {
    let view = PostView {
        title: &record.title,
        year: record.year_label(),
        rating: match record.rating {
            Some(_) => format!("{}/10", record.rating_label()),
            None => record.rating_label(),
        },
        genres: record.genres_label(),
        language: record.language(),
        quality: record.quality(),
        director: record.director(),
        overview: record.overview.trim(),
        poster_src: poster_src(&record.poster),
        backdrop_url: record.backdrop_url.as_deref(),
        cast: &record.cast,
        links: links
            .iter()
            .map(|link| LinkView {
                label: link.label(),
                url: link.url(),
            })
            .collect(),
        gate: options.gate.as_ref(),
    };

    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)
        .map_err(|e| RenderError::new(RenderErrorKind::Template(e.to_string())))?;
    let html = env
        .get_template(TEMPLATE_NAME)
        .and_then(|template| template.render(&view))
        .map_err(|e| RenderError::new(RenderErrorKind::Template(e.to_string())))?;

    debug!(
        bytes = html.len(),
        links = links.len(),
        gated = options.gate.is_some(),
        "Rendered HTML snippet"
    );
    Ok(html)
}
