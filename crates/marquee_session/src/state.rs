//! State tags, prompts and transition outcomes.

use crate::Action;
use serde::{Deserialize, Serialize};

/// Where a session is in the conversation.
///
/// `idle` is not a state: it is the absence of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StateTag {
    /// Manual entry: title
    ManualWaitTitle,
    /// Manual entry: four digit year
    ManualWaitYear,
    /// Manual entry: synopsis
    ManualWaitOverview,
    /// Manual entry: comma separated genres
    ManualWaitGenres,
    /// Manual entry: score or N/A
    ManualWaitRating,
    /// Manual entry: photo, image URL or skip
    ManualWaitPoster,
    /// Audio language
    AwaitingLanguage,
    /// Release quality
    AwaitingQuality,
    /// Yes/no: add a download link?
    AskLinks,
    /// Label for the next link
    AwaitingLinkLabel,
    /// URL for the pending link
    AwaitingLinkUrl,
    /// Artifacts generated, publication actions available
    Done,
}

/// What to tell the user after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    /// Ask for the title
    AskTitle,
    /// Ask for the year
    AskYear,
    /// Year was not four digits
    InvalidYear,
    /// Ask for the synopsis
    AskOverview,
    /// Ask for genres
    AskGenres,
    /// Ask for the rating
    AskRating,
    /// Rating was neither a number nor N/A
    InvalidRating,
    /// Ask for a poster
    AskPoster,
    /// Poster text was neither a URL nor skip
    InvalidPoster,
    /// Ask for the language
    AskLanguage,
    /// Ask for the quality
    AskQuality,
    /// Ask whether to add a link
    AskLinks,
    /// Link added; the count so far
    LinkAdded(usize),
    /// Ask for a link label
    AskLinkLabel,
    /// Ask for the link URL
    AskLinkUrl,
    /// URL was not http(s)
    InvalidUrl,
}

impl Prompt {
    /// Message text.
    pub fn text(&self) -> String {
        match self {
            Self::AskTitle => "✍️ Send the title.".to_string(),
            Self::AskYear => "📅 Send the release year (4 digits, e.g. 2023).".to_string(),
            Self::InvalidYear => {
                "❌ The year must be exactly 4 digits, e.g. 2023. Try again.".to_string()
            }
            Self::AskOverview => "📖 Send the plot summary (or 'skip').".to_string(),
            Self::AskGenres => "🎭 Send the genres, separated by commas.".to_string(),
            Self::AskRating => "⭐ Send the rating out of 10, or N/A.".to_string(),
            Self::InvalidRating => "❌ Send a number like 7.5, or N/A.".to_string(),
            Self::AskPoster => "🖼 Send a poster photo, an image URL, or 'skip'.".to_string(),
            Self::InvalidPoster => "❌ Send a photo, an http(s) image URL, or 'skip'.".to_string(),
            Self::AskLanguage => "🔊 Send the language (e.g. Hindi Dubbed).".to_string(),
            Self::AskQuality => "💿 Send the quality (e.g. 1080p WEB-DL), or 'skip'.".to_string(),
            Self::AskLinks => "🔗 Add a download link?".to_string(),
            Self::LinkAdded(count) => format!("✅ Link {} added. Add another?", count),
            Self::AskLinkLabel => "🏷 Send the button label (e.g. 720p).".to_string(),
            Self::AskLinkUrl => "🌐 Send the download URL (http:// or https://).".to_string(),
            Self::InvalidUrl => {
                "❌ That is not a valid link. It must start with http:// or https://.".to_string()
            }
        }
    }

    /// Whether the prompt expects a yes/no answer.
    pub fn wants_choice(&self) -> bool {
        matches!(self, Self::AskLinks | Self::LinkAdded(_))
    }
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Re-prompt without changing state or record
    Stay(Prompt),
    /// Move to the next state
    Advance(StateTag, Prompt),
    /// Collection complete; render artifacts
    Synthesize,
    /// Run a publication action on finished artifacts
    Publish(Action),
    /// Discard the session and search for this text
    Restart(String),
    /// Nothing to do
    Ignore,
}
