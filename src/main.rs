//! # Arcturus - station beacon core
//!
//! Command-line entry point.
//!
//! ## Commands
//!
//! 1. **replay** - Feed a recorded JSON Lines capture through the snapshot
//!    channel and reconciliation loop, printing intents to stdout
//! 2. **project** - Place one backend coordinate on the planet
//! 3. **check-config** - Validate a station config file
//!
//! ## Output
//!
//! Results go to stdout as JSON. Logs go to stderr, filtered by `RUST_LOG`
//! (default `info`).

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use arcturus::cli::Cli;
use arcturus::commands::execute_command;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Parsed command line");

    execute_command(cli.command).await
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
