//! Bot API payloads, limited to the fields Marquee reads.

use serde::Deserialize;

/// Envelope around every Bot API reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<u16>,
}

/// One incoming update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id
    pub update_id: i64,
    /// New message
    #[serde(default)]
    pub message: Option<Message>,
    /// Inline keyboard press
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    /// Inline query
    #[serde(default)]
    pub inline_query: Option<InlineQuery>,
}

/// Message author.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User id
    pub id: u64,
}

/// Conversation a message belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat id
    pub id: i64,
}

/// One size of an uploaded photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    /// Id for `getFile`
    pub file_id: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

/// Chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Sender, absent for channel posts
    #[serde(default)]
    pub from: Option<User>,
    /// Chat
    pub chat: Chat,
    /// Text body
    #[serde(default)]
    pub text: Option<String>,
    /// Photo sizes, smallest first
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
}

/// Inline keyboard press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Id to acknowledge
    pub id: String,
    /// Who pressed
    pub from: User,
    /// Message carrying the keyboard
    #[serde(default)]
    pub message: Option<Message>,
    /// Button payload
    #[serde(default)]
    pub data: Option<String>,
}

/// Inline query.
#[derive(Debug, Clone, Deserialize)]
pub struct InlineQuery {
    /// Id to answer
    pub id: String,
    /// Who typed
    pub from: User,
    /// Query text
    pub query: String,
}

/// `getFile` result.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct File {
    #[serde(default)]
    pub file_path: Option<String>,
}
