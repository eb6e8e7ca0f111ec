//! Core data types for Marquee.
//!
//! This crate provides the canonical [`ContentRecord`] every artifact is rendered
//! from, the validated [`LinkEntry`], the input validation rules used by the
//! conversation, and the [`MetadataNormalizer`] that maps raw provider records
//! onto a `ContentRecord`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod link;
mod normalize;
mod record;
mod validation;

pub use link::{InvalidLink, LinkEntry};
pub use normalize::{DEFAULT_BACKDROP_BASE, DEFAULT_POSTER_BASE, MetadataNormalizer};
pub use record::{ContentRecord, MediaKind, NOT_AVAILABLE, PosterSource};
pub use validation::{RatingInput, is_http_url, is_skip, parse_genres, parse_rating, parse_year};
