//! Bot configuration.
//!
//! Settings come from a TOML file; every section and field has a default so
//! an empty file is valid. Secrets are read from the environment (optionally
//! seeded from a `.env` file) and never from the TOML file.

use derive_getters::Getters;
use marquee_error::{ConfigError, MarqueeResult};
use marquee_metadata::TmdbConfig;
use marquee_publish::{PasteConfig, PublishOptions};
use marquee_session::FlowOptions;
use marquee_synth::{CaptionOptions, GateOptions};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable holding the Telegram bot token.
pub const TELEGRAM_TOKEN_VAR: &str = "MARQUEE_TELEGRAM_TOKEN";
/// Environment variable holding the TMDB API key.
pub const TMDB_API_KEY_VAR: &str = "MARQUEE_TMDB_API_KEY";

/// Telegram Bot API settings.
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct TelegramSettings {
    /// API root
    #[serde(default = "default_api_base")]
    api_base: String,
    /// Long polling timeout in seconds
    #[serde(default = "default_poll_timeout")]
    poll_timeout_secs: u64,
    /// Pause after a failed poll, in seconds
    #[serde(default = "default_retry_delay")]
    retry_delay_secs: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    5
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            poll_timeout_secs: default_poll_timeout(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// HTML snippet settings.
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct HtmlSettings {
    /// Wrap downloads in the ad-then-countdown gate
    #[serde(default)]
    gate_enabled: bool,
    /// Gate parameters; the ad URL can be overridden per user
    #[serde(default = "default_gate")]
    gate: GateOptions,
}

fn default_gate() -> GateOptions {
    GateOptions::default()
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            gate_enabled: false,
            gate: default_gate(),
        }
    }
}

impl HtmlSettings {
    /// Settings with the gate switched on or off.
    pub fn new(gate_enabled: bool, gate: GateOptions) -> Self {
        Self { gate_enabled, gate }
    }
}

/// Poster rendering settings.
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct PosterSettings {
    /// TTF/OTF font for poster text; without one the poster has no text
    #[serde(default)]
    font_path: Option<PathBuf>,
    /// Image download timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    fetch_timeout_secs: u64,
    /// Largest accepted image download
    #[serde(default = "default_max_image_bytes")]
    max_image_bytes: usize,
}

fn default_fetch_timeout() -> u64 {
    20
}

fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            font_path: None,
            fetch_timeout_secs: default_fetch_timeout(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Keep-alive HTTP server settings.
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct ServerSettings {
    /// Serve the keep-alive endpoint
    #[serde(default = "default_true")]
    enabled: bool,
    /// Listen address
    #[serde(default = "default_bind")]
    bind: SocketAddr,
}

fn default_true() -> bool {
    true
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_bind(),
        }
    }
}

/// Optional behaviors.
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct FeatureSettings {
    /// Answer inline queries with search results
    #[serde(default = "default_true")]
    inline_queries: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            inline_queries: true,
        }
    }
}

/// Where preference files live.
#[derive(Debug, Clone, Getters, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the preference JSON files
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Complete bot configuration, one TOML section per concern.
#[derive(Debug, Clone, Default, Getters, Deserialize)]
pub struct BotConfig {
    /// Telegram transport
    #[serde(default)]
    telegram: TelegramSettings,
    /// Metadata provider
    #[serde(default)]
    tmdb: TmdbConfig,
    /// Conversation flow
    #[serde(default)]
    flow: FlowOptions,
    /// Caption rendering
    #[serde(default)]
    caption: CaptionOptions,
    /// HTML rendering
    #[serde(default)]
    html: HtmlSettings,
    /// Poster rendering
    #[serde(default)]
    poster: PosterSettings,
    /// Publication
    #[serde(default)]
    publish: PublishOptions,
    /// Paste hosting
    #[serde(default)]
    paste: PasteConfig,
    /// Preference storage
    #[serde(default)]
    storage: StorageSettings,
    /// Keep-alive server
    #[serde(default)]
    server: ServerSettings,
    /// Optional behaviors
    #[serde(default)]
    features: FeatureSettings,
}

impl BotConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> MarqueeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid configuration.
    pub fn parse(content: &str) -> MarqueeResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> MarqueeResult<()> {
        let limit = *self.caption.plot_limit();
        if limit == 0 {
            return Err(ConfigError::new("caption.plot_limit must be positive").into());
        }
        if *self.publish.inline_threshold() == 0 {
            return Err(ConfigError::new("publish.inline_threshold must be positive").into());
        }
        if self.html.gate_enabled && !marquee_core::is_http_url(self.html.gate.ad_url()) {
            return Err(ConfigError::new(format!(
                "html.gate.ad_url must be an http(s) URL when the gate is enabled, got '{}'",
                self.html.gate.ad_url()
            ))
            .into());
        }
        debug!(plot_limit = limit, "Configuration validated");
        Ok(())
    }
}

/// Credentials read from the environment.
#[derive(Clone, Getters)]
pub struct Secrets {
    /// Telegram bot token
    telegram_token: String,
    /// TMDB API key
    tmdb_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_token", &"<redacted>")
            .field("tmdb_api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Create secrets directly.
    pub fn new(telegram_token: impl Into<String>, tmdb_api_key: impl Into<String>) -> Self {
        Self {
            telegram_token: telegram_token.into(),
            tmdb_api_key: tmdb_api_key.into(),
        }
    }

    /// Read secrets from the environment, loading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing variable.
    pub fn from_env() -> MarqueeResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }
        Ok(Self {
            telegram_token: require_var(TELEGRAM_TOKEN_VAR)?,
            tmdb_api_key: require_var(TMDB_API_KEY_VAR)?,
        })
    }
}

fn require_var(name: &str) -> MarqueeResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::new(format!("Environment variable {} is not set", name)).into()),
    }
}
