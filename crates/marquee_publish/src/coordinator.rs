//! Publication coordinator.

use derive_getters::Getters;
use marquee_core::ContentRecord;
use marquee_error::MarqueeResult;
use marquee_interface::{ChatId, ChatTarget, Messenger, Outbound, PasteOutcome, PasteService};
use marquee_session::{Action, Artifacts};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Platform limit on photo captions, in characters.
const PHOTO_CAPTION_LIMIT: usize = 1024;

/// Publication switches.
#[derive(Debug, Clone, Getters, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct PublishOptions {
    /// HTML shorter than this many characters is sent inline
    #[builder(default = "default_inline_threshold()")]
    #[serde(default = "default_inline_threshold")]
    inline_threshold: usize,
}

fn default_inline_threshold() -> usize {
    3500
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            inline_threshold: default_inline_threshold(),
        }
    }
}

/// Everything one publication action needs.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    /// Chat the user is talking from
    pub chat: ChatId,
    /// Finished record
    pub record: &'a ContentRecord,
    /// Rendered artifacts
    pub artifacts: &'a Artifacts,
    /// User's configured channel, if any
    pub channel: Option<&'a ChatTarget>,
}

fn photo_caption(caption: &str) -> String {
    if caption.chars().count() <= PHOTO_CAPTION_LIMIT {
        caption.to_string()
    } else {
        let mut cut: String = caption.chars().take(PHOTO_CAPTION_LIMIT - 3).collect();
        cut.push_str("...");
        cut
    }
}

/// Turns publication actions into outbound intents.
///
/// Each action can run any number of times for the same artifacts.
pub struct PublicationCoordinator {
    messenger: Arc<dyn Messenger>,
    paste: Arc<dyn PasteService>,
    options: PublishOptions,
}

impl std::fmt::Debug for PublicationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationCoordinator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PublicationCoordinator {
    /// Create a coordinator.
    pub fn new(
        messenger: Arc<dyn Messenger>,
        paste: Arc<dyn PasteService>,
        options: PublishOptions,
    ) -> Self {
        Self {
            messenger,
            paste,
            options,
        }
    }

    /// Run `action`.
    ///
    /// Channel and paste failures are reported to the user rather than
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if a message to the user cannot be delivered.
    #[instrument(skip(self, request), fields(chat = %request.chat, action = %action))]
    pub async fn publish(&self, action: Action, request: PublishRequest<'_>) -> MarqueeResult<()> {
        match action {
            Action::Caption => self.send_caption(request).await,
            Action::Html => self.send_html(request).await,
            Action::Paste => self.send_paste(request).await,
            Action::Channel => self.send_to_channel(request).await,
            Action::Poster => self.send_poster(request).await,
        }
    }

    async fn send_caption(&self, request: PublishRequest<'_>) -> MarqueeResult<()> {
        self.messenger
            .deliver(Outbound::text(request.chat, request.artifacts.caption().clone()))
            .await
    }

    fn html_document(&self, request: PublishRequest<'_>, caption: Option<String>) -> Outbound {
        Outbound::Document {
            chat: request.chat.into(),
            filename: format!("{}.html", request.record.slug()),
            bytes: request.artifacts.html().as_bytes().to_vec(),
            caption,
        }
    }

    async fn send_html(&self, request: PublishRequest<'_>) -> MarqueeResult<()> {
        let html = request.artifacts.html();
        let intent = if html.chars().count() < self.options.inline_threshold {
            Outbound::text(request.chat, format!("```html\n{}\n```", html))
        } else {
            self.html_document(request, Some("📄 HTML is too long to show inline.".to_string()))
        };
        self.messenger.deliver(intent).await
    }

    async fn send_paste(&self, request: PublishRequest<'_>) -> MarqueeResult<()> {
        match self.paste.publish(request.artifacts.html()).await {
            PasteOutcome::Published(url) => {
                info!(url = %url, "HTML published to paste service");
                self.messenger
                    .deliver(Outbound::text(request.chat, format!("🌐 HTML hosted at: {}", url)))
                    .await
            }
            PasteOutcome::Failed(reason) => {
                self.messenger
                    .deliver(Outbound::text(
                        request.chat,
                        format!("⚠️ Paste failed: {}. Sending the HTML as a file instead.", reason),
                    ))
                    .await?;
                self.messenger
                    .deliver(self.html_document(request, None))
                    .await
            }
        }
    }

    async fn send_to_channel(&self, request: PublishRequest<'_>) -> MarqueeResult<()> {
        let Some(channel) = request.channel else {
            return self
                .messenger
                .deliver(Outbound::text(
                    request.chat,
                    "ℹ️ No channel configured. Use /setchannel <id or @username> first.",
                ))
                .await;
        };

        let caption = request.artifacts.caption();
        let post = match request.artifacts.poster() {
            Some(bytes) => Outbound::Photo {
                chat: channel.clone(),
                bytes: bytes.clone(),
                caption: Some(photo_caption(caption)),
                buttons: Vec::new(),
            },
            None => Outbound::text(channel.clone(), caption.clone()),
        };

        let report = match self.messenger.deliver(post).await {
            Ok(()) => {
                info!(channel = %channel, "Posted to channel");
                format!("✅ Posted to {}", channel)
            }
            Err(e) => {
                error!(channel = %channel, error = %e, "Channel post failed");
                format!("❌ Posting to {} failed: {}", channel, e.detail())
            }
        };
        self.messenger
            .deliver(Outbound::text(request.chat, report))
            .await
    }

    async fn send_poster(&self, request: PublishRequest<'_>) -> MarqueeResult<()> {
        let intent = match request.artifacts.poster() {
            Some(bytes) => Outbound::Photo {
                chat: request.chat.into(),
                bytes: bytes.clone(),
                caption: Some(photo_caption(request.artifacts.caption())),
                buttons: Vec::new(),
            },
            None => Outbound::text(
                request.chat,
                "🖼 No poster could be generated for this title.",
            ),
        };
        self.messenger.deliver(intent).await
    }
}
