#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # Arcturus
//!
//! Beacon reconciliation and spherical projection for the station dashboard.
//!
//! This library re-exports the workspace crates and hosts the CLI handlers.

// Re-export all crates
pub use arcturus_core;
pub use arcturus_feed;
pub use arcturus_projection;
pub use arcturus_reconciler;

pub mod cli;
pub mod commands;
