//! Core error types for Arcturus operations.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for Arcturus operations.
#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("failed to read config '{path}': {reason}")]
    ConfigReadFailed { path: PathBuf, reason: String },

    #[error("TOML parse error: {reason}")]
    TomlParseFailed { reason: String },

    // Validation errors
    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a config read error.
    pub fn config_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a TOML parse error.
    pub fn toml_parse_failed(reason: impl Into<String>) -> Self {
        Self::TomlParseFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            reason: reason.into(),
        }
    }

    /// Whether this is a configuration error (rejected at construction time).
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::ConfigReadFailed { .. } | Self::TomlParseFailed { .. }
        )
    }

    /// Whether this is a record validation error (skipped, never fatal).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidRecord { .. })
    }
}
