//! Reconciliation loop draining the snapshot channel.

use std::sync::Arc;

use arcturus_core::ReconcilerSettings;
use arcturus_feed::{SequencedSnapshot, SnapshotReceiver};
use async_trait::async_trait;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::reconciler::BeaconSetReconciler;
use crate::types::ReconcileOutcome;

/// Configuration for the reconciliation loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum consecutive sink errors before stopping.
    pub max_errors: usize,
    /// Whether to stop on first sink error.
    pub stop_on_error: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        ReconcilerSettings::default().into()
    }
}

impl From<ReconcilerSettings> for LoopConfig {
    fn from(settings: ReconcilerSettings) -> Self {
        Self {
            max_errors: settings.max_sink_errors,
            stop_on_error: settings.stop_on_sink_error,
        }
    }
}

/// Consumer of reconciliation outcomes, typically the rendering layer.
#[async_trait]
pub trait IntentSink: Send + Sync {
    /// Apply the outcome of snapshot number `sequence`.
    async fn apply(&self, sequence: u64, outcome: &ReconcileOutcome) -> Result<()>;
}

/// Sink that keeps every outcome in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<(u64, ReconcileOutcome)>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the outcomes collected so far.
    pub async fn take(&self) -> Vec<(u64, ReconcileOutcome)> {
        std::mem::take(&mut *self.outcomes.lock().await)
    }

    /// Number of outcomes collected so far.
    pub async fn len(&self) -> usize {
        self.outcomes.lock().await.len()
    }

    /// Whether nothing has been collected.
    pub async fn is_empty(&self) -> bool {
        self.outcomes.lock().await.is_empty()
    }
}

#[async_trait]
impl IntentSink for CollectingSink {
    async fn apply(&self, sequence: u64, outcome: &ReconcileOutcome) -> Result<()> {
        self.outcomes.lock().await.push((sequence, outcome.clone()));
        Ok(())
    }
}

/// Totals for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Snapshots reconciled.
    pub snapshots: u64,
    /// Intents handed to the sink.
    pub intents: usize,
    /// Records rejected for failing validation.
    pub rejected: usize,
    /// Sink calls that failed.
    pub sink_failures: usize,
}

/// Drains a snapshot channel in arrival order, reconciling each snapshot and
/// handing the outcome to an [`IntentSink`].
pub struct ReconciliationLoop {
    /// The reconciler; only this loop touches its state.
    reconciler: BeaconSetReconciler,
    /// Incoming snapshots.
    receiver: SnapshotReceiver,
    /// Outcome consumer.
    sink: Arc<dyn IntentSink>,
    /// Loop configuration.
    config: LoopConfig,
    /// Stop signal receiver.
    stop_rx: watch::Receiver<bool>,
    /// Stop signal sender (for external control).
    stop_tx: watch::Sender<bool>,
}

impl ReconciliationLoop {
    /// Create a new reconciliation loop.
    pub fn new(
        reconciler: BeaconSetReconciler,
        receiver: SnapshotReceiver,
        sink: Arc<dyn IntentSink>,
        config: LoopConfig,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            reconciler,
            receiver,
            sink,
            config,
            stop_rx,
            stop_tx,
        }
    }

    /// Run the loop.
    ///
    /// Returns once every sender is gone and the queue is drained, or when
    /// stopped. A stop request wins over queued snapshots.
    ///
    /// # Errors
    ///
    /// Returns the sink error when `stop_on_error` is set, or
    /// [`Error::TooManySinkErrors`] once `max_errors` consecutive sink calls
    /// fail.
    pub async fn run(&mut self) -> Result<LoopSummary> {
        info!(
            max_errors = self.config.max_errors,
            stop_on_error = self.config.stop_on_error,
            "Starting reconciliation loop"
        );

        let mut summary = LoopSummary::default();
        let mut consecutive_errors = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                changed = self.stop_rx.changed() => {
                    if changed.is_err() || *self.stop_rx.borrow() {
                        info!(snapshots = summary.snapshots, "Reconciliation loop stopped");
                        return Ok(summary);
                    }
                    continue;
                }
                next = self.receiver.recv() => next,
            };

            let Some(item) = next else {
                info!(snapshots = summary.snapshots, "Snapshot channel closed, loop finished");
                return Ok(summary);
            };

            match self.reconcile_once(item, &mut summary).await {
                Ok(()) => consecutive_errors = 0,
                Err(e) => {
                    consecutive_errors += 1;
                    summary.sink_failures += 1;
                    error!(
                        error = %e,
                        consecutive = consecutive_errors,
                        "Intent sink error"
                    );

                    if self.config.stop_on_error {
                        return Err(e);
                    }

                    if consecutive_errors >= self.config.max_errors {
                        error!("Max errors reached, stopping loop");
                        return Err(Error::too_many_sink_errors(
                            consecutive_errors,
                            self.config.max_errors,
                        ));
                    }
                }
            }
        }
    }

    /// Reconcile one snapshot and hand the outcome to the sink.
    ///
    /// The state advances even if the sink fails; the next snapshot is
    /// diffed against what was reported, not against what was applied.
    async fn reconcile_once(
        &mut self,
        item: SequencedSnapshot,
        summary: &mut LoopSummary,
    ) -> Result<()> {
        let SequencedSnapshot { sequence, snapshot } = item;
        let outcome = self.reconciler.reconcile(&snapshot);

        summary.snapshots += 1;
        summary.intents += outcome.intents.len();
        summary.rejected += outcome.rejected.len();

        if !outcome.rejected.is_empty() {
            warn!(
                sequence,
                rejected = outcome.rejected.len(),
                "Snapshot carried invalid records"
            );
        }
        debug!(sequence, intents = outcome.intents.len(), "Handing outcome to sink");

        self.sink
            .apply(sequence, &outcome)
            .await
            .map_err(|e| match e {
                Error::SinkFailed { .. } => e,
                other => Error::sink_failed(sequence, other.to_string()),
            })
    }

    /// Get the reconciler.
    #[must_use]
    pub const fn reconciler(&self) -> &BeaconSetReconciler {
        &self.reconciler
    }

    /// Stop the loop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Get a stopper handle.
    #[must_use]
    pub fn stopper(&self) -> LoopStopper {
        LoopStopper {
            stop_tx: self.stop_tx.clone(),
        }
    }
}

/// Handle to stop a reconciliation loop.
#[derive(Clone)]
pub struct LoopStopper {
    stop_tx: watch::Sender<bool>,
}

impl LoopStopper {
    /// Stop the loop.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}
