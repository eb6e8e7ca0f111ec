//! Artifact synthesis for Marquee.
//!
//! Three independent renderers turn a finished [`marquee_core::ContentRecord`]
//! plus its download links into publishable artifacts:
//!
//! - [`render_caption`]: plain text caption for chat posts
//! - [`render_html`]: self-contained blog snippet, optionally with a gated
//!   download script
//! - [`PosterRenderer`]: composed raster poster
//!
//! All three are deterministic given the same record, links and remote image
//! bytes. Network access happens only through the injected
//! [`marquee_interface::ImageFetcher`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod caption;
mod fetch;
mod html;
mod poster;

pub use caption::{
    CaptionOptions, CaptionOptionsBuilder, PLOT_ELLIPSIS, render_caption, truncate_plot,
};
pub use fetch::HttpImageFetcher;
pub use html::{
    DOWNLOAD_ANCHOR_CLASS, GateOptions, GateOptionsBuilder, HtmlOptions, HtmlOptionsBuilder,
    NO_LINKS_CLASS, render_html,
};
pub use poster::{
    BadgeGeometry, PosterLayout, PosterRenderer, badge_geometry, compose_poster, wrap_chars,
};
