//! Telegram Bot API transport.
//!
//! [`TelegramClient`] implements [`marquee_interface::Messenger`] over the
//! HTTP Bot API. [`UpdatePoller`] long-polls `getUpdates` and turns each update
//! into an [`marquee_interface::Inbound`] event.

mod client;
mod poller;
mod types;

pub use client::TelegramClient;
pub use poller::UpdatePoller;
pub use types::{CallbackQuery, Chat, InlineQuery, Message, PhotoSize, Update, User};
