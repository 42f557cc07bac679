//! Snapshot reconciliation for station beacons.
//!
//! Each snapshot from the backend is the complete list of beacons it knows
//! about. The reconciler diffs it against the beacons currently present and
//! emits the changes a renderer must make:
//!
//! - **Create**: an id seen for the first time, with its [`Placement`]
//! - **Update**: an id already present, reported again
//! - **Remove**: a present id missing from the snapshot
//!
//! [`Placement`]: arcturus_projection::Placement
//!
//! # Ordering
//!
//! Creates and updates follow snapshot order. When an id repeats within one
//! snapshot only its last occurrence produces an intent. Removals come after
//! the scan, in ascending id order. Records with an empty id are reported in
//! [`ReconcileOutcome::rejected`] and otherwise ignored.
//!
//! # Example
//!
//! ```
//! use arcturus_core::{BeaconRecord, BeaconSnapshot, PlanetParameters, Position};
//! use arcturus_reconciler::{BeaconSetReconciler, IntentKind};
//!
//! # fn main() -> arcturus_reconciler::Result<()> {
//! let mut reconciler = BeaconSetReconciler::from_params(PlanetParameters::default())?;
//! let snapshot = BeaconSnapshot::now(vec![BeaconRecord::new(
//!     "b1",
//!     Position::new(0.0, 0.0, 0.0),
//!     "active",
//! )]);
//!
//! let outcome = reconciler.reconcile(&snapshot);
//! assert_eq!(outcome.count(IntentKind::Create), 1);
//! assert_eq!(reconciler.stats().active, 1);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod error;
pub mod r#loop;
pub mod reconciler;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use r#loop::{
    CollectingSink, IntentSink, LoopConfig, LoopStopper, LoopSummary, ReconciliationLoop,
};
pub use reconciler::{BeaconSetReconciler, plan};
pub use types::{
    BeaconStats, IntentKind, ReconcileOutcome, ReconciliationIntent, ReconciliationState,
    RejectedRecord,
};
