//! Metadata lookups against The Movie Database.
//!
//! [`TmdbClient`] implements [`marquee_interface::MetadataProvider`]: movie and
//! show searches run concurrently and are merged by popularity, and detail
//! lookups append credits and similar titles in one request.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod dto;

pub use client::{TmdbClient, TmdbConfig, TmdbConfigBuilder};
pub use dto::{SearchHit, SearchPage};
