//! Core types for the Arcturus beacon core.
//!
//! - **Beacon records**: identity, backend coordinates and status, as decoded
//!   from the station backend
//! - **Planet parameters**: validated geometry consumed by the projector
//! - **Station config**: TOML configuration for the whole pipeline
//! - **Errors**: configuration and validation errors shared by every crate

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use config::{FeedSettings, PlanetParameters, ReconcilerSettings, StationConfig};
pub use error::Error;
pub use result::{Result, ResultExt};
pub use types::{BeaconId, BeaconRecord, BeaconSnapshot, BeaconStatus, Position};
