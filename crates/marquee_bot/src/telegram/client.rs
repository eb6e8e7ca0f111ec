//! Bot API HTTP client.

use super::types::{ApiResponse, File, Update};
use async_trait::async_trait;
use marquee_error::{MarqueeResult, TransportError, TransportErrorKind};
use marquee_interface::{Button, ButtonAction, ChatTarget, InlineArticle, Messenger, Outbound};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

/// Longest caption the Bot API accepts on photos and documents.
const MEDIA_CAPTION_LIMIT: usize = 1024;

fn transport(kind: TransportErrorKind) -> TransportError {
    TransportError::new(kind)
}

fn chat_id(chat: &ChatTarget) -> Value {
    match chat {
        ChatTarget::Id(id) => json!(id),
        ChatTarget::Username(name) => json!(name),
    }
}

fn reply_markup(rows: &[Vec<Button>]) -> Option<Value> {
    if rows.is_empty() {
        return None;
    }
    let keyboard: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match &button.action {
                    ButtonAction::Callback(data) => {
                        json!({"text": button.label, "callback_data": data})
                    }
                    ButtonAction::Url(url) => json!({"text": button.label, "url": url}),
                })
                .collect()
        })
        .collect();
    Some(json!({ "inline_keyboard": keyboard }))
}

fn inline_result(article: &InlineArticle) -> Value {
    let mut result = json!({
        "type": "article",
        "id": article.id,
        "title": article.title,
        "description": article.description,
        "input_message_content": { "message_text": article.message_text },
    });
    if let Some(thumbnail) = &article.thumbnail_url {
        result["thumbnail_url"] = json!(thumbnail);
    }
    result
}

fn media_caption(caption: &str) -> String {
    caption.chars().take(MEDIA_CAPTION_LIMIT).collect()
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api: String,
    files: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client. `timeout` must exceed the long polling timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> MarqueeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport(TransportErrorKind::Request(e.to_string())))?;
        let base = api_base.trim_end_matches('/');
        Ok(Self {
            client,
            api: format!("{}/bot{}", base, token),
            files: format!("{}/file/bot{}", base, token),
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> MarqueeResult<T> {
        let status = response.status().as_u16();
        let reply: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| transport(TransportErrorKind::Decode(e.to_string())))?;
        if !reply.ok {
            return Err(transport(TransportErrorKind::Rejected {
                status: reply.error_code.unwrap_or(status),
                description: reply.description.unwrap_or_default(),
            })
            .into());
        }
        Ok(reply
            .result
            .ok_or_else(|| transport(TransportErrorKind::Decode("missing result".to_string())))?)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> MarqueeResult<T> {
        debug!(method = %method, "Bot API call");
        let response = self
            .client
            .post(format!("{}/{}", self.api, method))
            .json(body)
            .send()
            .await
            .map_err(|e| transport(TransportErrorKind::Request(e.without_url().to_string())))?;
        Self::decode(response).await
    }

    async fn call_form<T: DeserializeOwned>(&self, method: &str, form: Form) -> MarqueeResult<T> {
        debug!(method = %method, "Bot API upload");
        let response = self
            .client
            .post(format!("{}/{}", self.api, method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport(TransportErrorKind::Request(e.without_url().to_string())))?;
        Self::decode(response).await
    }

    fn upload_form(
        chat: &ChatTarget,
        field: &str,
        part: Part,
        caption: Option<&str>,
        buttons: &[Vec<Button>],
    ) -> Form {
        let mut form = Form::new()
            .text("chat_id", chat.to_string())
            .part(field.to_string(), part);
        if let Some(caption) = caption {
            form = form.text("caption", media_caption(caption));
        }
        if let Some(markup) = reply_markup(buttons) {
            form = form.text("reply_markup", markup.to_string());
        }
        form
    }

    fn file_part(bytes: Vec<u8>, filename: String, mime: &str) -> MarqueeResult<Part> {
        Ok(Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime)
            .map_err(|e| transport(TransportErrorKind::Request(e.to_string())))?)
    }

    /// Fetch updates after `offset`, waiting up to `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails or is rejected.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> MarqueeResult<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query", "inline_query"],
            }),
        )
        .await
    }

    /// Download an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the file cannot be located or downloaded.
    #[instrument(skip(self))]
    pub async fn download_file(&self, file_id: &str) -> MarqueeResult<Vec<u8>> {
        let file: File = self.call("getFile", &json!({ "file_id": file_id })).await?;
        let path = file
            .file_path
            .ok_or_else(|| transport(TransportErrorKind::Decode("file has no path".to_string())))?;
        let response = self
            .client
            .get(format!("{}/{}", self.files, path))
            .send()
            .await
            .map_err(|e| transport(TransportErrorKind::Request(e.without_url().to_string())))?;
        if !response.status().is_success() {
            return Err(transport(TransportErrorKind::Rejected {
                status: response.status().as_u16(),
                description: "file download failed".to_string(),
            })
            .into());
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport(TransportErrorKind::Request(e.without_url().to_string())))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn deliver(&self, intent: Outbound) -> MarqueeResult<()> {
        match intent {
            Outbound::Text {
                chat,
                text,
                buttons,
            } => {
                let mut body = json!({
                    "chat_id": chat_id(&chat),
                    "text": text,
                    "disable_web_page_preview": true,
                });
                if let Some(markup) = reply_markup(&buttons) {
                    body["reply_markup"] = markup;
                }
                self.call::<Value>("sendMessage", &body).await?;
            }
            Outbound::Photo {
                chat,
                bytes,
                caption,
                buttons,
            } => {
                let part = Self::file_part(bytes, "poster.png".to_string(), "image/png")?;
                let form = Self::upload_form(&chat, "photo", part, caption.as_deref(), &buttons);
                self.call_form::<Value>("sendPhoto", form).await?;
            }
            Outbound::Document {
                chat,
                filename,
                bytes,
                caption,
            } => {
                let mime = if filename.ends_with(".html") {
                    "text/html"
                } else {
                    "application/octet-stream"
                };
                let part = Self::file_part(bytes, filename, mime)?;
                let form = Self::upload_form(&chat, "document", part, caption.as_deref(), &[]);
                self.call_form::<Value>("sendDocument", form).await?;
            }
            Outbound::AnswerCallback { callback_id, text } => {
                let mut body = json!({ "callback_query_id": callback_id });
                if let Some(text) = text {
                    body["text"] = json!(text);
                }
                self.call::<Value>("answerCallbackQuery", &body).await?;
            }
            Outbound::AnswerInline { query_id, results } => {
                let results: Vec<Value> = results.iter().map(inline_result).collect();
                self.call::<Value>(
                    "answerInlineQuery",
                    &json!({
                        "inline_query_id": query_id,
                        "results": results,
                        "cache_time": 30,
                    }),
                )
                .await?;
            }
        }
        Ok(())
    }
}
