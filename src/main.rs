//! ClipDrop - clipboard history saver
//!
//! This is the main entry point for the ClipDrop command-line shell.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipdrop::cli::{Cli, CliHandler};
use clipdrop::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (settings, settings_error) = Settings::load_or_default(cli.config.as_deref());

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clipdrop={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(e) = settings_error {
        warn!("Settings file not fully usable, falling back to defaults: {}", e);
    }
    debug!("ClipDrop v{}", clipdrop::VERSION);

    let mut handler = CliHandler::new(settings, cli.config);
    handler.handle_command(cli.command).await?;

    Ok(())
}
