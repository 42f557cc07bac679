//! Decoding of backend beacon payloads.
//!
//! Two shapes arrive from the station backend:
//!
//! - the HTTP `GET /beacons` body: `{"beacons": [...], "count": n, "time": secs}`
//! - the socket `beacon_update` payload: `{"beacons": [...], "time": secs}`,
//!   sometimes wrapped in a one-element argument array
//!
//! Both decode to the same [`BeaconSnapshot`].

use arcturus_core::{BeaconRecord, BeaconSnapshot};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

#[derive(Debug, Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    beacons: Option<Vec<BeaconRecord>>,
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    time: Option<f64>,
}

/// Decode one beacon payload, in either wire shape.
///
/// A `null` or absent beacon list decodes to an empty snapshot; a missing
/// `time` stamps the snapshot at the UNIX epoch.
///
/// # Errors
///
/// Returns [`Error::DecodeFailed`] if the payload is not JSON or not a beacon
/// message, and [`Error::InvalidTimestamp`] if `time` is out of range.
pub fn decode_snapshot(payload: &str) -> Result<BeaconSnapshot> {
    let value: Value = serde_json::from_str(payload.trim())?;
    decode_value(unwrap_arguments(value)?)
}

/// Decode an already-parsed JSON value.
///
/// # Errors
///
/// See [`decode_snapshot`].
pub fn decode_value(value: Value) -> Result<BeaconSnapshot> {
    if !value.is_object() {
        return Err(Error::decode_failed("expected a JSON object"));
    }
    let wire: WireSnapshot = serde_json::from_value(value)?;
    let beacons = wire.beacons.unwrap_or_default();

    if let Some(count) = wire.count.filter(|count| *count != beacons.len()) {
        debug!(
            count,
            received = beacons.len(),
            "Beacon count disagrees with payload, trusting payload"
        );
    }

    let timestamp = wire.time.map_or(Ok(DateTime::<Utc>::UNIX_EPOCH), timestamp_from_secs)?;
    Ok(BeaconSnapshot::new(beacons, timestamp))
}

/// Socket payloads arrive as an argument list; the message is its first entry.
fn unwrap_arguments(value: Value) -> Result<Value> {
    match value {
        Value::Array(args) => args
            .into_iter()
            .next()
            .ok_or_else(|| Error::decode_failed("empty argument list")),
        other => Ok(other),
    }
}

/// Convert fractional UNIX seconds into a UTC timestamp.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] for non-finite or unrepresentable times.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn timestamp_from_secs(secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(Error::invalid_timestamp(secs));
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * NANOS_PER_SEC).round().min(NANOS_PER_SEC - 1.0) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos).ok_or_else(|| Error::invalid_timestamp(secs))
}
