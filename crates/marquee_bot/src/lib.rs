//! Marquee bot runtime.
//!
//! This crate turns the conversation state machine, renderers and publication
//! coordinator into a running Telegram bot:
//! - **Engine**: routes commands, searches, selections and session events
//! - **Telegram**: Bot API client and long polling loop
//! - **Dispatcher**: per-user FIFO queues, each drained by one worker task
//! - **API**: keep-alive HTTP endpoint for hosting platforms
//! - **BotServer**: builds everything from [`BotConfig`] and [`Secrets`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod callback;
mod config;
mod dispatch;
mod engine;
mod server;
pub mod telegram;

pub use api::{ApiState, create_router, serve, serve_listener};
pub use callback::CallbackData;
pub use config::{
    BotConfig, FeatureSettings, HtmlSettings, PosterSettings, Secrets, ServerSettings,
    StorageSettings, TELEGRAM_TOKEN_VAR, TMDB_API_KEY_VAR, TelegramSettings,
};
pub use dispatch::Dispatcher;
pub use engine::{Engine, EngineBuilder, EngineBuilderError, split_query_year};
pub use server::BotServer;
