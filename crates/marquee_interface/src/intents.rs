//! Inbound events and outbound intents exchanged with the messaging platform.

use serde::{Deserialize, Serialize};

/// Numeric identity of the person talking to the bot.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct UserId(pub u64);

/// Numeric identity of a private or group chat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{}", _0)]
pub struct ChatId(pub i64);

/// Where an outbound intent goes: a numeric chat or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(untagged)]
pub enum ChatTarget {
    /// Numeric chat id
    #[display("{}", _0)]
    Id(i64),
    /// Public channel username, including the leading `@`
    #[display("{}", _0)]
    Username(String),
}

impl ChatTarget {
    /// Parse what a user typed as a channel reference.
    ///
    /// Accepts `-100123`, `123` and `@channel`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(id) = value.parse::<i64>() {
            return Some(Self::Id(id));
        }
        let name = value.strip_prefix('@')?;
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Some(Self::Username(value.to_string()))
        } else {
            None
        }
    }
}

impl From<ChatId> for ChatTarget {
    fn from(chat: ChatId) -> Self {
        Self::Id(chat.0)
    }
}

/// One event received from the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Who sent it
    pub user: UserId,
    /// Chat it arrived in
    pub chat: ChatId,
    /// What was sent
    pub payload: InboundPayload,
}

/// Body of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// Plain text message
    Text(String),
    /// Slash command, name without the slash
    Command {
        /// Command name, lowercase
        name: String,
        /// Everything after the command
        args: String,
    },
    /// Photo upload, already downloaded
    Photo(Vec<u8>),
    /// Inline keyboard button press
    Callback {
        /// Platform callback id, needed to acknowledge
        id: String,
        /// Button payload
        data: String,
    },
    /// Inline query typed in any chat
    InlineQuery {
        /// Platform query id
        id: String,
        /// Query text
        query: String,
    },
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    /// Send callback data back to the bot
    Callback(String),
    /// Open a URL
    Url(String),
}

/// Inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Button text
    pub label: String,
    /// Press behavior
    pub action: ButtonAction,
}

impl Button {
    /// Button that sends `data` back as a callback.
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    /// Button that opens `url`.
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Inline query result rendered as a text article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineArticle {
    /// Unique id within the answer
    pub id: String,
    /// Result title
    pub title: String,
    /// Short description line
    pub description: String,
    /// Message sent when the result is chosen
    pub message_text: String,
    /// Optional thumbnail
    pub thumbnail_url: Option<String>,
}

/// Something the core wants the messaging platform to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send a text message
    Text {
        /// Destination
        chat: ChatTarget,
        /// Message body
        text: String,
        /// Inline keyboard rows
        buttons: Vec<Vec<Button>>,
    },
    /// Send an image
    Photo {
        /// Destination
        chat: ChatTarget,
        /// Encoded image bytes
        bytes: Vec<u8>,
        /// Caption under the image
        caption: Option<String>,
        /// Inline keyboard rows
        buttons: Vec<Vec<Button>>,
    },
    /// Send a file
    Document {
        /// Destination
        chat: ChatTarget,
        /// File name shown to the recipient
        filename: String,
        /// File contents
        bytes: Vec<u8>,
        /// Caption under the file
        caption: Option<String>,
    },
    /// Acknowledge a button press
    AnswerCallback {
        /// Callback id from the inbound event
        callback_id: String,
        /// Optional toast text
        text: Option<String>,
    },
    /// Answer an inline query
    AnswerInline {
        /// Query id from the inbound event
        query_id: String,
        /// Result list
        results: Vec<InlineArticle>,
    },
}

impl Outbound {
    /// Plain text without buttons.
    pub fn text(chat: impl Into<ChatTarget>, text: impl Into<String>) -> Self {
        Self::Text {
            chat: chat.into(),
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    /// Text with an inline keyboard.
    pub fn text_with_buttons(
        chat: impl Into<ChatTarget>,
        text: impl Into<String>,
        buttons: Vec<Vec<Button>>,
    ) -> Self {
        Self::Text {
            chat: chat.into(),
            text: text.into(),
            buttons,
        }
    }

    /// Text body if this is a text intent.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
