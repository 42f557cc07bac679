//! Core types for the reconciler.

use std::collections::BTreeMap;

use arcturus_core::{BeaconId, BeaconRecord, BeaconStatus};
use arcturus_projection::Placement;
use itertools::Itertools;
use serde::Serialize;

/// Beacons currently present in the consumer's view.
///
/// Keyed by id; iteration is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconciliationState {
    beacons: BTreeMap<BeaconId, BeaconRecord>,
}

impl ReconciliationState {
    /// Create a new empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) const fn from_map(beacons: BTreeMap<BeaconId, BeaconRecord>) -> Self {
        Self { beacons }
    }

    /// Get the last-applied record for a beacon.
    #[must_use]
    pub fn get(&self, id: &BeaconId) -> Option<&BeaconRecord> {
        self.beacons.get(id)
    }

    /// Whether a beacon is present.
    #[must_use]
    pub fn contains(&self, id: &BeaconId) -> bool {
        self.beacons.contains_key(id)
    }

    /// Present beacon ids, ascending.
    pub fn ids(&self) -> impl Iterator<Item = &BeaconId> {
        self.beacons.keys()
    }

    /// Present beacons, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = (&BeaconId, &BeaconRecord)> {
        self.beacons.iter()
    }

    /// Number of present beacons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    /// Whether no beacon is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    /// Count present beacons per status.
    #[must_use]
    pub fn stats(&self) -> BeaconStats {
        BeaconStats::from_records(self.beacons.values())
    }
}

/// Per-status beacon counts.
///
/// Unknown statuses count toward `total` only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BeaconStats {
    pub total: usize,
    pub active: usize,
    pub damaged: usize,
    pub offline: usize,
}

impl BeaconStats {
    /// Tally a set of records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BeaconRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut stats, record| {
                stats.total += 1;
                match record.status_kind() {
                    BeaconStatus::Active => stats.active += 1,
                    BeaconStatus::Damaged => stats.damaged += 1,
                    BeaconStatus::Offline => stats.offline += 1,
                    BeaconStatus::Unknown => {}
                }
                stats
            })
    }

    /// Count for one status; `Unknown` has no dedicated counter and yields 0.
    #[must_use]
    pub const fn count(&self, status: BeaconStatus) -> usize {
        match status {
            BeaconStatus::Active => self.active,
            BeaconStatus::Damaged => self.damaged,
            BeaconStatus::Offline => self.offline,
            BeaconStatus::Unknown => 0,
        }
    }

    /// Counts keyed by status name, plus `total`.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, usize> {
        std::iter::once(("total", self.total))
            .chain(
                BeaconStatus::TRACKED
                    .iter()
                    .map(|status| (status.as_str(), self.count(*status))),
            )
            .collect()
    }
}

/// Kind of change an intent asks the consumer to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Create,
    Update,
    Remove,
}

/// One change the consumer must apply to its scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "intent", rename_all = "lowercase")]
pub enum ReconciliationIntent {
    /// A beacon appeared.
    Create {
        id: BeaconId,
        record: BeaconRecord,
        placement: Placement,
    },
    /// A present beacon was reported again.
    Update {
        id: BeaconId,
        record: BeaconRecord,
        placement: Placement,
    },
    /// A present beacon is no longer reported.
    Remove { id: BeaconId },
}

impl ReconciliationIntent {
    /// Get the beacon this intent targets.
    #[must_use]
    pub const fn id(&self) -> &BeaconId {
        match self {
            Self::Create { id, .. } | Self::Update { id, .. } | Self::Remove { id } => id,
        }
    }

    /// Get the kind of change.
    #[must_use]
    pub const fn kind(&self) -> IntentKind {
        match self {
            Self::Create { .. } => IntentKind::Create,
            Self::Update { .. } => IntentKind::Update,
            Self::Remove { .. } => IntentKind::Remove,
        }
    }

    /// Get the record carried by a create or update.
    #[must_use]
    pub const fn record(&self) -> Option<&BeaconRecord> {
        match self {
            Self::Create { record, .. } | Self::Update { record, .. } => Some(record),
            Self::Remove { .. } => None,
        }
    }

    /// Get the placement carried by a create or update.
    #[must_use]
    pub const fn placement(&self) -> Option<&Placement> {
        match self {
            Self::Create { placement, .. } | Self::Update { placement, .. } => Some(placement),
            Self::Remove { .. } => None,
        }
    }

    /// Get a description of the intent.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Create {
                id,
                record,
                placement,
            } => format!(
                "create beacon {id} ({}) at r={:.3}",
                record.status_kind(),
                placement.radius()
            ),
            Self::Update {
                id,
                record,
                placement,
            } => format!(
                "update beacon {id} ({}) at r={:.3}",
                record.status_kind(),
                placement.radius()
            ),
            Self::Remove { id } => format!("remove beacon {id}"),
        }
    }
}

/// A snapshot record skipped because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position of the record within its snapshot.
    pub index: usize,
    /// Why it was rejected.
    pub reason: String,
}

/// Result of reconciling one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    /// Intents to apply, in order: creates and updates in snapshot order,
    /// then removals in ascending id order.
    pub intents: Vec<ReconciliationIntent>,
    /// Records skipped for failing validation.
    pub rejected: Vec<RejectedRecord>,
}

impl ReconcileOutcome {
    /// Number of intents of the given kind.
    #[must_use]
    pub fn count(&self, kind: IntentKind) -> usize {
        self.intents.iter().filter(|intent| intent.kind() == kind).count()
    }

    /// Ids targeted by intents of the given kind, in emission order.
    #[must_use]
    pub fn ids(&self, kind: IntentKind) -> Vec<&BeaconId> {
        self.intents
            .iter()
            .filter(|intent| intent.kind() == kind)
            .map(ReconciliationIntent::id)
            .collect_vec()
    }

    /// Whether every record was reported again unchanged in membership:
    /// no creates and no removals.
    #[must_use]
    pub fn is_steady(&self) -> bool {
        self.intents
            .iter()
            .all(|intent| intent.kind() == IntentKind::Update)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use arcturus_core::Position;

    fn record(id: &str, status: &str) -> BeaconRecord {
        BeaconRecord::new(id, Position::default(), status)
    }

    #[test]
    fn test_stats_ignore_unknown_except_total() {
        let records = [
            record("b1", "active"),
            record("b2", "DAMAGED"),
            record("b3", "Offline"),
            record("b4", "weird"),
        ];
        let stats = BeaconStats::from_records(&records);

        assert_eq!(
            stats,
            BeaconStats {
                total: 4,
                active: 1,
                damaged: 1,
                offline: 1
            }
        );
    }

    #[test]
    fn test_stats_map_has_every_key() {
        let map = BeaconStats::default().to_map();
        assert_eq!(
            map.keys().copied().collect_vec(),
            vec!["active", "damaged", "offline", "total"]
        );
    }

    #[test]
    fn test_intent_description() {
        let intent = ReconciliationIntent::Remove {
            id: BeaconId::parse("b9").unwrap(),
        };
        assert!(intent.description().contains("remove"));
        assert_eq!(intent.kind(), IntentKind::Remove);
        assert!(intent.placement().is_none());
    }

    #[test]
    fn test_intent_serializes_with_tag() {
        let intent = ReconciliationIntent::Remove {
            id: BeaconId::parse("b9").unwrap(),
        };
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json, serde_json::json!({"intent": "remove", "id": "b9"}));
    }
}
