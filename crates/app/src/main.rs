//! Envlink - Main Entry Point
//!
//! Loads settings, initializes tracing, opens the JSON store and runs one
//! command against it.

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use envlink_infrastructure::{JsonFileVariableStore, Settings};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    // Initialize tracing; RUST_LOG wins over -v and the configured level
    let level = match cli.verbose {
        0 => settings.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        data_file = %settings.data_file.display(),
        "Starting envlink v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = JsonFileVariableStore::open(&settings.data_file)
        .await
        .with_context(|| format!("failed to open store {}", settings.data_file.display()))?;

    commands::run(cli.command, &settings, &store).await
}
