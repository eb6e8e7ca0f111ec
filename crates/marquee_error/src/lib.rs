//! Error types for Marquee.
//!
//! This crate provides the foundation error types used throughout the Marquee workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use marquee_error::{MarqueeResult, HttpError};
//!
//! fn fetch_poster() -> MarqueeResult<Vec<u8>> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_poster() {
//!     Ok(bytes) => println!("Got {} bytes", bytes.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod json;
mod render;
mod session;
mod storage;
mod transport;

pub use config::ConfigError;
pub use error::{MarqueeError, MarqueeErrorKind, MarqueeResult};
pub use http::HttpError;
pub use json::JsonError;
pub use render::{RenderError, RenderErrorKind};
pub use session::{SessionError, SessionErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use transport::{TransportError, TransportErrorKind};
