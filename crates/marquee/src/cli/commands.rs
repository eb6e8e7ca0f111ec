//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marquee - Telegram bot that turns titles into ready-to-post captions, HTML and posters
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(
    about = "Telegram bot that turns titles into ready-to-post captions, HTML and posters",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "MARQUEE_JSON_LOGS")]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot until interrupted
    Run {
        /// Configuration file (defaults to ./marquee.toml, then the user config directory)
        #[arg(long, env = "MARQUEE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Load and validate configuration and secrets, then exit
    CheckConfig {
        /// Configuration file (defaults to ./marquee.toml, then the user config directory)
        #[arg(long, env = "MARQUEE_CONFIG")]
        config: Option<PathBuf>,
    },
}
