//! Marquee CLI binary.
//!
//! Runs the Telegram bot or validates its configuration.

use clap::Parser;

mod cli;
mod observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_config, run_bot};
    use observability::{ObservabilityConfig, init_observability};

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut logging = ObservabilityConfig::new().with_json_logs(cli.json_logs);
    if cli.verbose {
        logging = logging.with_log_level("debug");
    }
    init_observability(&logging)?;

    match cli.command {
        Commands::Run { config } => run_bot(config).await?,
        Commands::CheckConfig { config } => check_config(config)?,
    }

    Ok(())
}
