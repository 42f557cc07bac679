//! Snapshot delivery for the Arcturus beacon core.
//!
//! This crate sits between the transport and the reconciler:
//!
//! - **Wire decoding**: HTTP and socket beacon payloads into [`BeaconSnapshot`]s
//! - **Snapshot channel**: bounded single-consumer queue, drained in arrival order
//! - **Replay**: JSON Lines recordings streamed into the channel
//!
//! # Example
//!
//! ```ignore
//! use arcturus_feed::{snapshot_channel, replay};
//!
//! #[tokio::main]
//! async fn main() -> arcturus_feed::Result<()> {
//!     let (tx, mut rx) = snapshot_channel(64)?;
//!     tokio::spawn(async move { replay::pump("beacons.jsonl", &tx, None).await });
//!
//!     while let Some(item) = rx.recv().await {
//!         println!("#{}: {} beacons", item.sequence, item.snapshot.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`BeaconSnapshot`]: arcturus_core::BeaconSnapshot

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod channel;
pub mod error;
pub mod replay;
pub mod wire;

pub use channel::{SequencedSnapshot, SnapshotReceiver, SnapshotSender, snapshot_channel};
pub use error::{Error, Result};
pub use replay::ReplayReport;
pub use wire::{decode_snapshot, decode_value, timestamp_from_secs};
