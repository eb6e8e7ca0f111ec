//! Composed poster image.
//!
//! The poster is pasted onto a blurred, darkened backdrop (or a flat dark
//! canvas), optionally stamped with a language badge, and captioned with the
//! title, rating, genres and a character-wrapped synopsis.

use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use marquee_core::{ContentRecord, PosterSource};
use marquee_error::{MarqueeResult, RenderError, RenderErrorKind};
use marquee_interface::ImageFetcher;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Fixed geometry and palette of the composed poster.
#[derive(Debug, Clone, PartialEq)]
pub struct PosterLayout {
    /// Output width and height
    pub canvas: (u32, u32),
    /// Poster region size
    pub poster_size: (u32, u32),
    /// Top-left corner of the poster region
    pub poster_offset: (i64, i64),
    /// Flat background when there is no backdrop
    pub background: Rgba<u8>,
    /// Overlay darkening the backdrop
    pub shade: Rgba<u8>,
    /// Backdrop blur sigma
    pub blur_sigma: f32,
    /// Left edge of the text column
    pub text_x: i32,
    /// Baselines (top) of title, rating and genres rows
    pub title_y: i32,
    /// Rating row
    pub rating_y: i32,
    /// Genres row
    pub genres_y: i32,
    /// First synopsis row
    pub overview_y: i32,
    /// Vertical distance between synopsis rows
    pub line_height: i32,
    /// Characters per title row
    pub title_chars: usize,
    /// Characters per synopsis row
    pub wrap_chars: usize,
    /// Maximum synopsis rows
    pub max_lines: usize,
    /// Title glyph size
    pub title_scale: f32,
    /// Body glyph size
    pub body_scale: f32,
    /// Badge glyph size
    pub badge_scale: f32,
    /// Horizontal padding around badge text
    pub badge_pad_x: u32,
    /// Vertical padding around badge text
    pub badge_pad_y: u32,
    /// Distance between the poster top and the badge
    pub badge_top: u32,
    /// Badge fill, semi-opaque
    pub badge_fill: Rgba<u8>,
    /// Title color
    pub accent: Rgba<u8>,
    /// Body text color
    pub ink: Rgba<u8>,
}

impl Default for PosterLayout {
    fn default() -> Self {
        Self {
            canvas: (1280, 720),
            poster_size: (320, 480),
            poster_offset: (60, 120),
            background: Rgba([18, 18, 26, 255]),
            shade: Rgba([0, 0, 0, 150]),
            blur_sigma: 6.0,
            text_x: 430,
            title_y: 120,
            rating_y: 192,
            genres_y: 234,
            overview_y: 292,
            line_height: 34,
            title_chars: 32,
            wrap_chars: 58,
            max_lines: 8,
            title_scale: 46.0,
            body_scale: 26.0,
            badge_scale: 26.0,
            badge_pad_x: 16,
            badge_pad_y: 8,
            badge_top: 16,
            badge_fill: Rgba([229, 9, 20, 200]),
            accent: Rgba([245, 197, 24, 255]),
            ink: Rgba([236, 236, 242, 255]),
        }
    }
}

/// Where the language badge and its text go, relative to the poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeGeometry {
    /// Badge left edge
    pub x: u32,
    /// Badge top edge
    pub y: u32,
    /// Badge width
    pub width: u32,
    /// Badge height
    pub height: u32,
    /// Text left edge
    pub text_x: u32,
    /// Text top edge
    pub text_y: u32,
}

/// Size a badge around text of `text_size` and center it on a poster
/// `poster_width` wide. `None` when the badge would not fit.
///
/// # Examples
///
/// ```
/// use marquee_synth::{PosterLayout, badge_geometry};
///
/// let layout = PosterLayout::default();
/// let badge = badge_geometry(320, (100, 20), &layout).unwrap();
/// assert_eq!(badge.width, 132);
/// assert_eq!(badge.x, 94);
/// ```
pub fn badge_geometry(
    poster_width: u32,
    text_size: (u32, u32),
    layout: &PosterLayout,
) -> Option<BadgeGeometry> {
    let (text_w, text_h) = text_size;
    let width = text_w.checked_add(layout.badge_pad_x * 2)?;
    let height = text_h + layout.badge_pad_y * 2;
    if width > poster_width || text_w == 0 {
        return None;
    }
    let x = (poster_width - width) / 2;
    Some(BadgeGeometry {
        x,
        y: layout.badge_top,
        width,
        height,
        text_x: x + layout.badge_pad_x,
        text_y: layout.badge_top + layout.badge_pad_y,
    })
}

/// Split `text` every `width` characters, keeping at most `max_lines` rows.
///
/// The split ignores word boundaries; whitespace runs collapse to one space
/// and rows are trimmed.
///
/// # Examples
///
/// ```
/// use marquee_synth::wrap_chars;
///
/// assert_eq!(wrap_chars("abcdefg", 3, 2), vec!["abc", "def"]);
/// ```
pub fn wrap_chars(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.split_whitespace().collect::<Vec<_>>().join(" ").chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect::<String>().trim().to_string())
        .filter(|line| !line.is_empty())
        .take(max_lines)
        .collect()
}

fn decode(bytes: &[u8]) -> MarqueeResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)
        .map_err(|e| RenderError::new(RenderErrorKind::Decode(e.to_string())))?)
}

fn draw_badge(
    poster: &mut RgbaImage,
    language: &str,
    font: Option<&FontArc>,
    layout: &PosterLayout,
) -> MarqueeResult<()> {
    let font = font.ok_or_else(|| {
        RenderError::new(RenderErrorKind::Font("no font configured".to_string()))
    })?;
    let scale = PxScale::from(layout.badge_scale);
    let label = language.to_uppercase();
    let measured = text_size(scale, font, &label);
    let geometry = badge_geometry(poster.width(), measured, layout).ok_or_else(|| {
        RenderError::new(RenderErrorKind::Font(format!(
            "badge text '{}' does not fit the poster",
            label
        )))
    })?;

    let mut badge = RgbaImage::from_pixel(geometry.width, geometry.height, layout.badge_fill);
    draw_text_mut(
        &mut badge,
        layout.ink,
        layout.badge_pad_x as i32,
        layout.badge_pad_y as i32,
        scale,
        font,
        &label,
    );
    imageops::overlay(poster, &badge, geometry.x as i64, geometry.y as i64);
    Ok(())
}

fn truncate_line(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

/// Compose the poster from decoded images. Pure and synchronous.
///
/// Text is drawn only when a font is supplied. A badge that cannot be drawn is
/// skipped.
///
/// # Errors
///
/// Returns an encode error if the PNG cannot be written.
pub fn compose_poster(
    poster: &DynamicImage,
    backdrop: Option<&DynamicImage>,
    record: &ContentRecord,
    font: Option<&FontArc>,
    layout: &PosterLayout,
) -> MarqueeResult<Vec<u8>> {
    let (width, height) = layout.canvas;
    let mut canvas = match backdrop {
        Some(backdrop) => {
            let filled = backdrop
                .resize_to_fill(width, height, FilterType::Triangle)
                .to_rgba8();
            let mut blurred = imageops::blur(&filled, layout.blur_sigma);
            let shade = RgbaImage::from_pixel(width, height, layout.shade);
            imageops::overlay(&mut blurred, &shade, 0, 0);
            blurred
        }
        None => RgbaImage::from_pixel(width, height, layout.background),
    };

    let (poster_w, poster_h) = layout.poster_size;
    let mut framed = poster
        .resize_exact(poster_w, poster_h, FilterType::Lanczos3)
        .to_rgba8();
    if let Some(language) = record.language()
        && let Err(e) = draw_badge(&mut framed, language, font, layout)
    {
        debug!(error = %e, "Skipping language badge");
    }
    let (offset_x, offset_y) = layout.poster_offset;
    imageops::overlay(&mut canvas, &framed, offset_x, offset_y);

    if let Some(font) = font {
        let title_scale = PxScale::from(layout.title_scale);
        let body_scale = PxScale::from(layout.body_scale);
        let title = truncate_line(
            &format!("{} ({})", record.title, record.year_label()),
            layout.title_chars,
        );
        draw_text_mut(
            &mut canvas,
            layout.accent,
            layout.text_x,
            layout.title_y,
            title_scale,
            font,
            &title,
        );

        let rating = match record.rating {
            Some(_) => format!("Rating: {}/10", record.rating_label()),
            None => format!("Rating: {}", record.rating_label()),
        };
        draw_text_mut(
            &mut canvas,
            layout.ink,
            layout.text_x,
            layout.rating_y,
            body_scale,
            font,
            &rating,
        );

        let genres = truncate_line(
            &format!("Genres: {}", record.genres_label()),
            layout.wrap_chars,
        );
        draw_text_mut(
            &mut canvas,
            layout.ink,
            layout.text_x,
            layout.genres_y,
            body_scale,
            font,
            &genres,
        );

        for (row, line) in wrap_chars(&record.overview, layout.wrap_chars, layout.max_lines)
            .iter()
            .enumerate()
        {
            let y = layout.overview_y + layout.line_height * row as i32;
            draw_text_mut(&mut canvas, layout.ink, layout.text_x, y, body_scale, font, line);
        }
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .to_rgb8()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| RenderError::new(RenderErrorKind::Encode(e.to_string())))?;
    Ok(bytes)
}

/// Fetches images and composes posters off the async runtime.
#[derive(Clone)]
pub struct PosterRenderer {
    fetcher: Arc<dyn ImageFetcher>,
    font: Option<FontArc>,
    layout: PosterLayout,
}

impl std::fmt::Debug for PosterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosterRenderer")
            .field("has_font", &self.font.is_some())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl PosterRenderer {
    /// Create a renderer with the default layout.
    pub fn new(fetcher: Arc<dyn ImageFetcher>, font: Option<FontArc>) -> Self {
        Self {
            fetcher,
            font,
            layout: PosterLayout::default(),
        }
    }

    /// Replace the layout.
    pub fn with_layout(mut self, layout: PosterLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Load a TTF/OTF font from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a font.
    pub fn load_font(path: impl AsRef<Path>) -> MarqueeResult<FontArc> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            RenderError::new(RenderErrorKind::Font(format!("{}: {}", path.display(), e)))
        })?;
        Ok(FontArc::try_from_vec(data).map_err(|e| {
            RenderError::new(RenderErrorKind::Font(format!("{}: {}", path.display(), e)))
        })?)
    }

    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        match self.fetcher.fetch(url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(url = %url, error = %e, "Image fetch failed");
                None
            }
        }
    }

    /// Render the poster for `record`.
    ///
    /// Returns `None`, never a partial image, when there is no poster source
    /// or any image cannot be fetched or decoded.
    #[instrument(skip(self, record), fields(title = %record.title))]
    pub async fn render(&self, record: &ContentRecord) -> Option<Vec<u8>> {
        let poster_bytes = match &record.poster {
            PosterSource::Remote(url) => self.fetch(url).await?,
            PosterSource::Uploaded(bytes) => bytes.clone(),
            PosterSource::None => {
                debug!("No poster source, skipping poster");
                return None;
            }
        };
        let backdrop_bytes = match &record.backdrop_url {
            Some(url) => Some(self.fetch(url).await?),
            None => None,
        };

        let record = record.clone();
        let font = self.font.clone();
        let layout = self.layout.clone();
        let task = tokio::task::spawn_blocking(move || -> MarqueeResult<Vec<u8>> {
            let poster = decode(&poster_bytes)?;
            let backdrop = backdrop_bytes.as_deref().map(decode).transpose()?;
            compose_poster(&poster, backdrop.as_ref(), &record, font.as_ref(), &layout)
        });

        let composed: MarqueeResult<Vec<u8>> = task
            .await
            .map_err(|e| RenderError::new(RenderErrorKind::Task(e.to_string())))
            .map_err(Into::into)
            .and_then(|result| result);
        match composed {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Poster composed");
                Some(bytes)
            }
            Err(e) => {
                warn!(error = %e, "Poster composition failed");
                None
            }
        }
    }
}
