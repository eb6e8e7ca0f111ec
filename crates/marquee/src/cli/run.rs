//! Command handlers.

use marquee_bot::{BotConfig, BotServer, Secrets};
use marquee_error::MarqueeResult;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name looked up when no configuration path is given.
pub const CONFIG_FILE_NAME: &str = "marquee.toml";

/// Candidate configuration paths, in lookup order.
pub fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("marquee").join(CONFIG_FILE_NAME));
    }
    candidates
}

/// Load configuration from the first existing candidate.
///
/// With no explicit path and no file found, defaults are used.
pub fn load_config(explicit: Option<&Path>) -> MarqueeResult<BotConfig> {
    let candidates = config_candidates(explicit);
    if explicit.is_some() {
        return BotConfig::from_file(&candidates[0]);
    }
    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => BotConfig::from_file(path),
        None => {
            warn!("No configuration file found, using defaults");
            Ok(BotConfig::default())
        }
    }
}

/// Handle the `run` command
pub async fn run_bot(config_path: Option<PathBuf>) -> MarqueeResult<()> {
    let config = load_config(config_path.as_deref())?;
    let secrets = Secrets::from_env()?;

    info!("Marquee starting. Press Ctrl+C to stop.");
    let server = BotServer::new(config, secrets);
    tokio::select! {
        result = server.start() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

/// Handle the `check-config` command
pub fn check_config(config_path: Option<PathBuf>) -> MarqueeResult<()> {
    let config = load_config(config_path.as_deref())?;
    Secrets::from_env()?;
    println!("{:#?}", config);
    println!("Configuration OK");
    Ok(())
}
