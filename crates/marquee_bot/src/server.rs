//! Wires configuration, collaborators and the runtime loops together.

use crate::api::{ApiState, create_router, serve};
use crate::config::{BotConfig, Secrets};
use crate::dispatch::Dispatcher;
use crate::engine::{Engine, EngineBuilder};
use crate::telegram::{TelegramClient, UpdatePoller};
use marquee_error::{ConfigError, MarqueeResult};
use marquee_interface::Messenger;
use marquee_metadata::TmdbClient;
use marquee_publish::{HttpPasteService, Preferences, PublicationCoordinator};
use marquee_session::{InMemorySessionStore, StateMachine};
use marquee_synth::{HttpImageFetcher, PosterRenderer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Extra time the HTTP client allows beyond the long polling timeout.
const POLL_GRACE_SECS: u64 = 10;

/// Runs the bot: keep-alive server, update poller and dispatcher.
#[derive(Debug, Clone)]
pub struct BotServer {
    config: BotConfig,
    secrets: Secrets,
}

impl BotServer {
    /// Creates a new bot server.
    pub fn new(config: BotConfig, secrets: Secrets) -> Self {
        Self { config, secrets }
    }

    /// Build the engine with production collaborators around `messenger`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built, the font cannot be
    /// loaded, or the preference files are unreadable.
    #[instrument(skip_all)]
    pub fn build_engine(&self, messenger: Arc<dyn Messenger>) -> MarqueeResult<Engine> {
        let config = &self.config;

        let tmdb = TmdbClient::new(
            config
                .tmdb()
                .clone()
                .with_api_key(self.secrets.tmdb_api_key().clone()),
        )?;

        let poster_settings = config.poster();
        let fetcher = HttpImageFetcher::new(
            Duration::from_secs(*poster_settings.fetch_timeout_secs()),
            *poster_settings.max_image_bytes(),
        )?;
        let font = match poster_settings.font_path() {
            Some(path) => Some(PosterRenderer::load_font(path)?),
            None => {
                warn!("No poster font configured, posters will have no text");
                None
            }
        };
        let poster = PosterRenderer::new(Arc::new(fetcher), font);

        let paste = HttpPasteService::new(config.paste())?;
        let coordinator = PublicationCoordinator::new(
            Arc::clone(&messenger),
            Arc::new(paste),
            config.publish().clone(),
        );

        let preferences = Preferences::open(config.storage().data_dir())?;
        let machine = StateMachine::standard(config.flow().clone())?;

        EngineBuilder::default()
            .messenger(messenger)
            .metadata(Arc::new(tmdb))
            .sessions(Arc::new(InMemorySessionStore::new()))
            .preferences(Arc::new(preferences))
            .poster(poster)
            .coordinator(Arc::new(coordinator))
            .machine(machine)
            .caption(config.caption().clone())
            .html(config.html().clone())
            .inline_queries(*config.features().inline_queries())
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build engine: {}", e)).into())
    }

    /// Starts every loop and runs until the update poller stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine or Telegram client cannot be built.
    #[instrument(skip(self))]
    pub async fn start(self) -> MarqueeResult<()> {
        info!("Starting Marquee");

        let telegram = self.config.telegram();
        let client = Arc::new(TelegramClient::new(
            telegram.api_base(),
            self.secrets.telegram_token(),
            Duration::from_secs(telegram.poll_timeout_secs() + POLL_GRACE_SECS),
        )?);
        let engine = Arc::new(self.build_engine(client.clone())?);

        let server = self.config.server();
        if *server.enabled() {
            let bind = *server.bind();
            tokio::spawn(async move {
                if let Err(e) = serve(bind, create_router(ApiState::new())).await {
                    error!(error = %e, "Keep-alive server stopped");
                }
            });
        }

        let (tx, rx) = mpsc::channel(64);
        let poller = UpdatePoller::new(
            client,
            *telegram.poll_timeout_secs(),
            Duration::from_secs(*telegram.retry_delay_secs()),
        );
        let dispatcher = Dispatcher::new(engine);

        let dispatch_handle = tokio::spawn(dispatcher.run(rx));
        poller.run(tx).await;

        if let Err(e) = dispatch_handle.await {
            error!(error = %e, "Dispatcher task failed");
        }
        info!("Marquee stopped");
        Ok(())
    }
}
