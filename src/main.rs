//! CLI entry point for the commenter client.

use anyhow::{Context, Result};
use clap::Parser;
use commenter_core::config::load_default_file_config;
use commenter_core::{AppConfig, AppContext};
use tracing::debug;

mod cli;
mod commands;
mod terminal;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = load_default_file_config().context("Failed to load configuration")?;
    let mut config = AppConfig::from_file(loaded.config.as_ref());

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config > info
    terminal::init_tracing(terminal::default_log_level(
        args.verbose,
        args.quiet,
        config.verbosity,
    ));

    debug!(
        path = ?loaded.path,
        from_file = loaded.loaded_from_file(),
        "Configuration resolved"
    );

    if let Some(api_url) = &args.api_url {
        config.api_base_url.clone_from(api_url);
    }
    if args.ephemeral {
        config.ephemeral = true;
    }

    let context = AppContext::build(&config).context("Failed to initialise session")?;
    commands::dispatch(&args.command, &context).await
}
