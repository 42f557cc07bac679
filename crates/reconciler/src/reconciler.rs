//! Snapshot reconciler.

use std::collections::{BTreeMap, HashMap};

use arcturus_core::{BeaconId, BeaconRecord, BeaconSnapshot, PlanetParameters};
use arcturus_projection::SphericalProjector;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::types::{
    BeaconStats, IntentKind, ReconcileOutcome, ReconciliationIntent, ReconciliationState,
    RejectedRecord,
};

/// Keeps the set of present beacons in step with successive snapshots.
///
/// Not synchronized: snapshots must be delivered one at a time. Use
/// [`crate::ReconciliationLoop`] to drain a snapshot channel in order.
#[derive(Debug, Clone)]
pub struct BeaconSetReconciler {
    /// Projector used by [`Self::reconcile`].
    projector: SphericalProjector,
    /// Beacons currently present.
    state: ReconciliationState,
}

impl BeaconSetReconciler {
    /// Create a reconciler with an empty state.
    #[must_use]
    pub fn new(projector: SphericalProjector) -> Self {
        Self {
            projector,
            state: ReconciliationState::new(),
        }
    }

    /// Create a reconciler from raw planet parameters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the parameters are invalid.
    pub fn from_params(params: PlanetParameters) -> Result<Self> {
        Ok(Self::new(SphericalProjector::new(params)?))
    }

    /// Apply one snapshot using the reconciler's own projector.
    pub fn reconcile(&mut self, snapshot: &BeaconSnapshot) -> ReconcileOutcome {
        let (outcome, next) = plan(&self.state, snapshot, &self.projector);
        self.commit(next, &outcome);
        outcome
    }

    /// Apply one snapshot, placing beacons with the given projector.
    pub fn reconcile_with(
        &mut self,
        snapshot: &BeaconSnapshot,
        projector: &SphericalProjector,
    ) -> ReconcileOutcome {
        let (outcome, next) = plan(&self.state, snapshot, projector);
        self.commit(next, &outcome);
        outcome
    }

    /// Get the beacons currently present.
    #[must_use]
    pub const fn state(&self) -> &ReconciliationState {
        &self.state
    }

    /// Count present beacons per status.
    #[must_use]
    pub fn stats(&self) -> BeaconStats {
        self.state.stats()
    }

    /// Get the default projector.
    #[must_use]
    pub const fn projector(&self) -> &SphericalProjector {
        &self.projector
    }

    fn commit(&mut self, next: ReconciliationState, outcome: &ReconcileOutcome) {
        self.state = next;
        info!(
            created = outcome.count(IntentKind::Create),
            updated = outcome.count(IntentKind::Update),
            removed = outcome.count(IntentKind::Remove),
            rejected = outcome.rejected.len(),
            present = self.state.len(),
            "Snapshot reconciled"
        );
    }
}

/// Compute the intents that take `prior` to `snapshot`, and the state after.
///
/// Pure: `prior` is left untouched, so a caller can swap the returned state
/// in as a single step.
#[must_use]
pub fn plan(
    prior: &ReconciliationState,
    snapshot: &BeaconSnapshot,
    projector: &SphericalProjector,
) -> (ReconcileOutcome, ReconciliationState) {
    let mut rejected = Vec::new();
    let valid = snapshot
        .beacons
        .iter()
        .enumerate()
        .filter_map(|(index, record)| match record.beacon_id() {
            Ok(id) => Some((id, record)),
            Err(e) => {
                warn!(index, error = %e, "Skipping invalid beacon record");
                rejected.push(RejectedRecord {
                    index,
                    reason: e.to_string(),
                });
                None
            }
        })
        .collect_vec();

    // Only the last occurrence of a repeated id is applied.
    let last_seen: HashMap<&BeaconId, usize> = valid
        .iter()
        .enumerate()
        .map(|(position, (id, _))| (id, position))
        .collect();

    let mut next: BTreeMap<BeaconId, BeaconRecord> = BTreeMap::new();
    let mut intents = Vec::with_capacity(last_seen.len());

    for (position, (id, record)) in valid.iter().enumerate() {
        if last_seen.get(id) != Some(&position) {
            debug!(id = %id, "Superseded by a later record in the same snapshot");
            continue;
        }
        let placement = projector.project(record);
        let record = (*record).clone();
        next.insert(id.clone(), record.clone());

        let intent = if prior.contains(id) {
            ReconciliationIntent::Update {
                id: id.clone(),
                record,
                placement,
            }
        } else {
            ReconciliationIntent::Create {
                id: id.clone(),
                record,
                placement,
            }
        };
        debug!(intent = %intent.description(), "Planned");
        intents.push(intent);
    }

    intents.extend(
        prior
            .ids()
            .filter(|id| !next.contains_key(*id))
            .map(|id| ReconciliationIntent::Remove { id: id.clone() }),
    );

    (
        ReconcileOutcome { intents, rejected },
        ReconciliationState::from_map(next),
    )
}
