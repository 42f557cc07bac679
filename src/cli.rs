//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Arcturus - station beacon core
#[derive(Parser, Debug)]
#[command(name = "arcturus")]
#[command(version)]
#[command(about = "Reconcile station beacon snapshots and place them on the planet")]
#[command(
    long_about = "Arcturus replays recorded beacon feeds through the reconciler, printing the create/update/remove intents a renderer would apply, and projects backend coordinates onto the planet sphere."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a JSON Lines recording and print intents as JSON lines
    Replay {
        /// Recording file, one beacon payload per line
        #[arg(short, long)]
        input: PathBuf,

        /// Station config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pause between snapshots in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Project one backend coordinate and print its placement
    Project {
        /// Planar x coordinate
        #[arg(short, long, allow_hyphen_values = true)]
        x: f64,

        /// Altitude coordinate
        #[arg(short, long, allow_hyphen_values = true)]
        y: f64,

        /// Planar z coordinate
        #[arg(short, long, allow_hyphen_values = true)]
        z: f64,

        /// Station config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a station config file
    CheckConfig {
        /// Station config file (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },
}
