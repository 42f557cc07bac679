//! Error types for the feed crate.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Feed error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Payload was not valid JSON or not a beacon message.
    #[error("failed to decode beacon payload: {reason}")]
    DecodeFailed { reason: String },

    /// Snapshot time could not be represented.
    #[error("invalid snapshot time: {time}")]
    InvalidTimestamp { time: String },

    /// Replay file could not be read.
    #[error("failed to read replay file '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// Every receiver was dropped.
    #[error("snapshot channel closed")]
    ChannelClosed,

    /// Channel is at capacity (non-blocking send only).
    #[error("snapshot channel full")]
    ChannelFull,

    /// Channel was asked for no buffer at all.
    #[error("snapshot channel capacity must be at least 1, got {capacity}")]
    InvalidCapacity { capacity: usize },
}

impl Error {
    /// Create a decode error.
    pub fn decode_failed(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid timestamp error.
    pub fn invalid_timestamp(time: f64) -> Self {
        Self::InvalidTimestamp {
            time: time.to_string(),
        }
    }

    /// Create a read error.
    pub fn read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::decode_failed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::read_failed("/tmp/beacons.jsonl", "permission denied");
        assert!(err.to_string().contains("/tmp/beacons.jsonl"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_invalid_capacity_display() {
        let err = Error::InvalidCapacity { capacity: 0 };
        assert!(err.to_string().contains("at least 1, got 0"));
    }

    #[test]
    fn test_invalid_timestamp_display() {
        let err = Error::invalid_timestamp(f64::NAN);
        assert!(err.to_string().contains("invalid snapshot time"));
        assert!(err.to_string().contains("NaN"));
    }
}
