//! Beacon records and snapshots as delivered by the station backend.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;
use crate::result::Result;

/// Validated, non-empty beacon identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BeaconId(String);

impl BeaconId {
    /// Parse an identifier, rejecting the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if `raw` is empty.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(Error::invalid_record("beacon id is empty"));
        }
        Ok(Self(raw))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BeaconId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<BeaconId> for String {
    fn from(id: BeaconId) -> Self {
        id.0
    }
}

impl fmt::Display for BeaconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operational status of a beacon.
///
/// Parsed case-insensitively; anything outside the known set is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BeaconStatus {
    Active,
    Damaged,
    Offline,
    #[default]
    Unknown,
}

impl BeaconStatus {
    /// Every status with a dedicated counter in beacon stats.
    pub const TRACKED: [Self; 3] = [Self::Active, Self::Damaged, Self::Offline];

    /// Classify a raw status label. Only case is ignored; padded labels are
    /// `Unknown`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "damaged" => Self::Damaged,
            "offline" => Self::Offline,
            _ => Self::Unknown,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Damaged => "damaged",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }

    /// Indicator light colour used by the dashboard, as linear RGB.
    #[must_use]
    pub const fn indicator_rgb(self) -> [f32; 3] {
        match self {
            Self::Active => [0.0, 1.0, 0.0],
            Self::Damaged => [1.0, 0.92, 0.016],
            Self::Offline => [1.0, 0.0, 0.0],
            Self::Unknown => [1.0, 1.0, 1.0],
        }
    }

    /// Indicator pulse rate in radians per second.
    #[must_use]
    pub const fn pulse_rate(self) -> f32 {
        match self {
            Self::Active => 2.0,
            Self::Damaged => 4.0,
            Self::Offline => 0.5,
            Self::Unknown => 1.0,
        }
    }
}

impl FromStr for BeaconStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl fmt::Display for BeaconStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-native beacon coordinates.
///
/// `x` and `z` are planar map coordinates; `y` is an altitude-like scalar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub z: f64,
}

impl Position {
    /// Create a position from its three coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One telemetry unit as received from the backend.
///
/// The id is kept raw here; it is validated when the record is reconciled.
/// The status label is kept verbatim so it flows to the consumer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(flatten)]
    pub position: Position,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
}

impl BeaconRecord {
    /// Create a new record.
    pub fn new(id: impl Into<String>, position: Position, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            status: status.into(),
        }
    }

    /// Validated identifier of this record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the id is empty.
    pub fn beacon_id(&self) -> Result<BeaconId> {
        BeaconId::parse(self.id.as_str())
    }

    /// Classified status.
    #[must_use]
    pub fn status_kind(&self) -> BeaconStatus {
        BeaconStatus::from_label(&self.status)
    }
}

/// A `null` field decodes like a missing one, so one bad record cannot sink
/// the snapshot it arrived in.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// All beacons known to the backend at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconSnapshot {
    pub beacons: Vec<BeaconRecord>,
    pub timestamp: DateTime<Utc>,
}

impl BeaconSnapshot {
    /// Create a snapshot taken at `timestamp`.
    #[must_use]
    pub const fn new(beacons: Vec<BeaconRecord>, timestamp: DateTime<Utc>) -> Self {
        Self { beacons, timestamp }
    }

    /// Create a snapshot stamped with the current time.
    #[must_use]
    pub fn now(beacons: Vec<BeaconRecord>) -> Self {
        Self::new(beacons, Utc::now())
    }

    /// An empty snapshot, meaning "no beacons remain".
    #[must_use]
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self::new(Vec::new(), timestamp)
    }

    /// Number of records, including invalid ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    /// Whether the snapshot carries no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }
}
