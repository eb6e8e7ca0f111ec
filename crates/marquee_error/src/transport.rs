//! Messaging transport error types.

/// Messaging failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// Request never reached the platform
    #[display("Request failed: {}", _0)]
    Request(String),
    /// Platform rejected the request
    #[display("Platform rejected request ({}): {}", status, description)]
    Rejected {
        /// HTTP status or platform error code
        status: u16,
        /// Platform error description
        description: String,
    },
    /// Platform reply could not be decoded
    #[display("Unexpected response: {}", _0)]
    Decode(String),
}

/// Transport error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Transport Error: {} at line {} in {}", kind, line, file)]
pub struct TransportError {
    /// The kind of error that occurred
    pub kind: TransportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new transport error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
