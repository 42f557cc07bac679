//! Error types for the reconciler crate.

use std::fmt;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid configuration; the reconciler was not built.
    InvalidConfig { reason: String },
    /// The intent consumer failed to apply an outcome.
    SinkFailed { sequence: u64, reason: String },
    /// Too many consecutive consumer failures; the loop gave up.
    TooManySinkErrors { consecutive: usize, max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::SinkFailed { sequence, reason } => {
                write!(f, "intent sink failed on snapshot #{sequence}: {reason}")
            }
            Self::TooManySinkErrors { consecutive, max } => {
                write!(f, "intent sink failed {consecutive} times in a row (max {max})")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<arcturus_core::Error> for Error {
    fn from(err: arcturus_core::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl Error {
    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a sink failed error.
    pub fn sink_failed(sequence: u64, reason: impl Into<String>) -> Self {
        Self::SinkFailed {
            sequence,
            reason: reason.into(),
        }
    }

    /// Create a too-many-sink-errors error.
    #[must_use]
    pub const fn too_many_sink_errors(consecutive: usize, max: usize) -> Self {
        Self::TooManySinkErrors { consecutive, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::sink_failed(7, "scene is gone");
        assert!(err.to_string().contains("#7"));
        assert!(err.to_string().contains("scene is gone"));
    }

    #[test]
    fn test_core_error_becomes_invalid_config() {
        let err: Error = arcturus_core::Error::invalid_config("radius", "must be > 0").into();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(err.to_string().contains("radius"));
    }
}
