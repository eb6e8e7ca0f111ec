//! Long polling loop.

use super::TelegramClient;
use super::types::{Message, Update};
use marquee_interface::{ChatId, Inbound, InboundPayload, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// An update that is ready, or a photo that still has to be downloaded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Incoming {
    Ready(Inbound),
    Photo {
        user: UserId,
        chat: ChatId,
        file_id: String,
    },
}

/// Split `/name@bot args` into a lowercase name and the argument text.
pub(crate) fn parse_command(text: &str) -> Option<(String, String)> {
    let rest = text.trim().strip_prefix('/')?;
    let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    Some((name, args.trim().to_string()))
}

fn from_message(message: Message) -> Option<Incoming> {
    let user = UserId(message.from?.id);
    let chat = ChatId(message.chat.id);

    if let Some(photos) = message.photo {
        let largest = photos
            .into_iter()
            .max_by_key(|size| u64::from(size.width) * u64::from(size.height))?;
        return Some(Incoming::Photo {
            user,
            chat,
            file_id: largest.file_id,
        });
    }

    let text = message.text?;
    let payload = match parse_command(&text) {
        Some((name, args)) => InboundPayload::Command { name, args },
        None => InboundPayload::Text(text),
    };
    Some(Incoming::Ready(Inbound {
        user,
        chat,
        payload,
    }))
}

/// Map one update to an inbound event; `None` for updates Marquee ignores.
pub(crate) fn classify(update: Update) -> Option<Incoming> {
    if let Some(message) = update.message {
        return from_message(message);
    }
    if let Some(query) = update.callback_query {
        let user = UserId(query.from.id);
        let chat = query
            .message
            .map(|message| ChatId(message.chat.id))
            .unwrap_or(ChatId(query.from.id as i64));
        return Some(Incoming::Ready(Inbound {
            user,
            chat,
            payload: InboundPayload::Callback {
                id: query.id,
                data: query.data.unwrap_or_default(),
            },
        }));
    }
    if let Some(query) = update.inline_query {
        return Some(Incoming::Ready(Inbound {
            user: UserId(query.from.id),
            chat: ChatId(query.from.id as i64),
            payload: InboundPayload::InlineQuery {
                id: query.id,
                query: query.query,
            },
        }));
    }
    None
}

/// Pulls updates and forwards them as [`Inbound`] events.
#[derive(Debug)]
pub struct UpdatePoller {
    client: Arc<TelegramClient>,
    timeout_secs: u64,
    retry_delay: Duration,
    offset: i64,
}

impl UpdatePoller {
    /// Create a poller starting from the oldest unconfirmed update.
    pub fn new(client: Arc<TelegramClient>, timeout_secs: u64, retry_delay: Duration) -> Self {
        Self {
            client,
            timeout_secs,
            retry_delay,
            offset: 0,
        }
    }

    async fn resolve(&self, incoming: Incoming) -> Option<Inbound> {
        match incoming {
            Incoming::Ready(inbound) => Some(inbound),
            Incoming::Photo {
                user,
                chat,
                file_id,
            } => match self.client.download_file(&file_id).await {
                Ok(bytes) => Some(Inbound {
                    user,
                    chat,
                    payload: InboundPayload::Photo(bytes),
                }),
                Err(e) => {
                    warn!(user_id = %user, error = %e, "Photo download failed");
                    None
                }
            },
        }
    }

    /// Poll until the receiving side closes.
    #[instrument(skip_all)]
    pub async fn run(mut self, tx: mpsc::Sender<Inbound>) {
        info!("Polling for updates");
        loop {
            let updates = match self.client.get_updates(self.offset, self.timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
            };

            for update in updates {
                self.offset = self.offset.max(update.update_id + 1);
                let Some(incoming) = classify(update) else {
                    continue;
                };
                let Some(inbound) = self.resolve(incoming).await else {
                    continue;
                };
                debug!(user_id = %inbound.user, "Forwarding update");
                if tx.send(inbound).await.is_err() {
                    info!("Dispatcher closed, stopping poller");
                    return;
                }
            }
        }
    }
}
