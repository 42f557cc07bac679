//! Single-consumer snapshot channel.
//!
//! The network side pushes decoded snapshots from whatever task it runs on;
//! the reconciliation side drains them strictly in arrival order. Senders are
//! cheap to clone, so an initial HTTP fetch, a polling fallback and a socket
//! stream can all feed the same queue.

use arcturus_core::{BeaconSnapshot, ResultExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::wire::decode_snapshot;

/// A snapshot tagged with its position in the arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedSnapshot {
    /// Zero-based arrival index on the receiving side.
    pub sequence: u64,
    /// The delivered snapshot.
    pub snapshot: BeaconSnapshot,
}

/// Create a bounded snapshot channel.
///
/// # Errors
///
/// Returns [`Error::InvalidCapacity`] if `capacity` is zero, the same value
/// station config validation rejects.
pub fn snapshot_channel(capacity: usize) -> Result<(SnapshotSender, SnapshotReceiver)> {
    if capacity == 0 {
        return Err(Error::InvalidCapacity { capacity });
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((
        SnapshotSender { tx },
        SnapshotReceiver {
            rx,
            next_sequence: 0,
        },
    ))
}

/// Producer handle for the snapshot channel.
#[derive(Debug, Clone)]
pub struct SnapshotSender {
    tx: mpsc::Sender<BeaconSnapshot>,
}

impl SnapshotSender {
    /// Send a snapshot, waiting for capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the receiver was dropped.
    pub async fn send(&self, snapshot: BeaconSnapshot) -> Result<()> {
        self.tx.send(snapshot).await.map_err(|_| Error::ChannelClosed)
    }

    /// Send a snapshot without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelFull`] at capacity and [`Error::ChannelClosed`]
    /// if the receiver was dropped.
    pub fn try_send(&self, snapshot: BeaconSnapshot) -> Result<()> {
        self.tx.try_send(snapshot).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => Error::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => Error::ChannelClosed,
        })
    }

    /// Decode a raw wire payload and send it.
    ///
    /// Malformed payloads are logged and dropped; returns whether the payload
    /// was delivered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the receiver was dropped.
    pub async fn send_payload(&self, payload: &str) -> Result<bool> {
        match decode_snapshot(payload).into_option_logged("Dropping malformed beacon payload") {
            Some(snapshot) => self.send(snapshot).await.map(|()| true),
            None => Ok(false),
        }
    }

    /// Whether the receiver has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer handle for the snapshot channel.
#[derive(Debug)]
pub struct SnapshotReceiver {
    rx: mpsc::Receiver<BeaconSnapshot>,
    next_sequence: u64,
}

impl SnapshotReceiver {
    /// Receive the next snapshot. `None` once every sender is dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<SequencedSnapshot> {
        let snapshot = self.rx.recv().await?;
        Some(self.stamp(snapshot))
    }

    /// Receive without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] when the queue is empty and no sender
    /// remains; `Ok(None)` when the queue is merely empty.
    pub fn try_recv(&mut self) -> Result<Option<SequencedSnapshot>> {
        match self.rx.try_recv() {
            Ok(snapshot) => Ok(Some(self.stamp(snapshot))),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// Stop accepting new snapshots; queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Number of snapshots received so far.
    #[must_use]
    pub const fn received(&self) -> u64 {
        self.next_sequence
    }

    fn stamp(&mut self, snapshot: BeaconSnapshot) -> SequencedSnapshot {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        debug!(sequence, beacons = snapshot.len(), "Snapshot dequeued");
        SequencedSnapshot { sequence, snapshot }
    }
}
