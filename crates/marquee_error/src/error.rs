//! Top-level error wrapper types.

use crate::{
    ConfigError, HttpError, JsonError, RenderError, SessionError, SessionErrorKind, StorageError,
    TransportError,
};

/// Every error condition a Marquee crate can surface.
///
/// # Examples
///
/// ```
/// use marquee_error::{MarqueeError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: MarqueeError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum MarqueeErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Preference storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Artifact rendering error
    #[from(RenderError)]
    Render(RenderError),
    /// Conversation session error
    #[from(SessionError)]
    Session(SessionError),
    /// Messaging transport error
    #[from(TransportError)]
    Transport(TransportError),
}

/// Marquee error with kind discrimination.
///
/// # Examples
///
/// ```
/// use marquee_error::{MarqueeResult, ConfigError};
///
/// fn might_fail() -> MarqueeResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Marquee Error: {}", _0)]
pub struct MarqueeError(Box<MarqueeErrorKind>);

impl MarqueeError {
    /// Create a new error from a kind.
    pub fn new(kind: MarqueeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MarqueeErrorKind {
        &self.0
    }

    /// The underlying message or kind, without the source location.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_error::{MarqueeError, HttpError};
    ///
    /// let err: MarqueeError = HttpError::new("timeout").into();
    /// assert_eq!(err.detail(), "timeout");
    /// ```
    pub fn detail(&self) -> String {
        match self.kind() {
            MarqueeErrorKind::Http(e) => e.message.clone(),
            MarqueeErrorKind::Json(e) => e.message.clone(),
            MarqueeErrorKind::Config(e) => e.message.clone(),
            MarqueeErrorKind::Storage(e) => e.kind.to_string(),
            MarqueeErrorKind::Render(e) => e.kind.to_string(),
            MarqueeErrorKind::Session(e) => e.kind.to_string(),
            MarqueeErrorKind::Transport(e) => e.kind.to_string(),
        }
    }

    /// Short explanation safe to show to an end user.
    ///
    /// Unlike `Display`, it carries no source locations, paths or upstream
    /// response bodies.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_error::{MarqueeError, HttpError};
    ///
    /// let err: MarqueeError = HttpError::new("timeout").into();
    /// assert!(!err.user_message().contains("line"));
    /// ```
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            MarqueeErrorKind::Http(_) => "A network request failed. Please try again.",
            MarqueeErrorKind::Json(_) => "An upstream service sent data I could not read.",
            MarqueeErrorKind::Config(_) => "The bot is misconfigured.",
            MarqueeErrorKind::Storage(_) => "Your settings could not be saved or loaded.",
            MarqueeErrorKind::Render(_) => "The post could not be rendered.",
            MarqueeErrorKind::Session(e) => match e.kind {
                SessionErrorKind::NotFound(_) => {
                    "Your session has expired. Search again to start over."
                }
                _ => "The conversation flow hit an internal error.",
            },
            MarqueeErrorKind::Transport(_) => "Telegram could not be reached. Please try again.",
        }
    }
}

// Generic From implementation for any type that converts to MarqueeErrorKind
impl<T> From<T> for MarqueeError
where
    T: Into<MarqueeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Marquee operations.
pub type MarqueeResult<T> = std::result::Result<T, MarqueeError>;
