//! Conversation session error types.

/// Session failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SessionErrorKind {
    /// No session exists for the user
    #[display("No active session for user {}", _0)]
    NotFound(u64),
    /// Transition table is missing a declaration
    #[display("Transition table has no rule for state '{}' on '{}' events", state, event)]
    UndeclaredTransition {
        /// State tag
        state: String,
        /// Event kind
        event: String,
    },
    /// Transition table declares a pair twice
    #[display("Transition table declares state '{}' on '{}' events twice", state, event)]
    DuplicateTransition {
        /// State tag
        state: String,
        /// Event kind
        event: String,
    },
}

/// Session error with location tracking.
///
/// # Examples
///
/// ```
/// use marquee_error::{SessionError, SessionErrorKind};
///
/// let err = SessionError::new(SessionErrorKind::NotFound(42));
/// assert!(format!("{}", err).contains("42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Session Error: {} at line {} in {}", kind, line, file)]
pub struct SessionError {
    /// The kind of error that occurred
    pub kind: SessionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SessionError {
    /// Create a new session error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SessionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SessionErrorKind {
        &self.kind
    }
}
