//! Button callback payloads.

use marquee_core::MediaKind;
use marquee_session::Action;
use std::str::FromStr;

/// Decoded callback data.
///
/// # Examples
///
/// ```
/// use marquee_bot::CallbackData;
/// use marquee_core::MediaKind;
///
/// let data = CallbackData::Select { kind: MediaKind::Show, id: 1399 };
/// assert_eq!(data.encode(), "sel:show:1399");
/// assert_eq!(CallbackData::parse("sel:tv:1399"), Some(data));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    /// Pick a search result
    Select {
        /// Movie or show
        kind: MediaKind,
        /// Provider id
        id: u64,
    },
    /// Answer the "add a link?" question
    Links(bool),
    /// Run a publication action
    Publish(Action),
    /// Drop the session
    Cancel,
}

impl CallbackData {
    /// Wire form, well under the platform's 64 byte limit.
    pub fn encode(&self) -> String {
        match self {
            Self::Select { kind, id } => format!("sel:{}:{}", kind, id),
            Self::Links(true) => "links:yes".to_string(),
            Self::Links(false) => "links:no".to_string(),
            Self::Publish(action) => format!("pub:{}", action),
            Self::Cancel => "cancel".to_string(),
        }
    }

    /// Decode wire form; `None` for anything unrecognized.
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.trim().split(':');
        let head = parts.next()?;
        let parsed = match head {
            "sel" => {
                let kind = MediaKind::from_str(parts.next()?).ok()?;
                let id = parts.next()?.parse().ok()?;
                Self::Select { kind, id }
            }
            "links" => match parts.next()? {
                "yes" => Self::Links(true),
                "no" => Self::Links(false),
                _ => return None,
            },
            "pub" => Self::Publish(Action::from_str(parts.next()?).ok()?),
            "cancel" => Self::Cancel,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(parsed)
    }
}
