//! Artifact rendering error types.

/// Specific rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderErrorKind {
    /// Image bytes could not be decoded
    #[display("Failed to decode image: {}", _0)]
    Decode(String),
    /// Image could not be encoded to the output format
    #[display("Failed to encode image: {}", _0)]
    Encode(String),
    /// Remote image could not be fetched
    #[display("Failed to fetch image {}: {}", url, reason)]
    Fetch {
        /// Image URL
        url: String,
        /// Failure detail
        reason: String,
    },
    /// Font data is unusable
    #[display("Invalid font: {}", _0)]
    Font(String),
    /// Markup template failed
    #[display("Template error: {}", _0)]
    Template(String),
    /// Blocking render task panicked or was cancelled
    #[display("Render task failed: {}", _0)]
    Task(String),
}

/// Rendering error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The kind of error that occurred
    pub kind: RenderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RenderError {
    /// Create a new render error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
