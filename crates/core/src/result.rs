//! Result type definition and extension traits.
//!
//! Provides combinators for skip-and-continue handling of telemetry data,
//! without unwrap/expect/panic.

use crate::error::Error;

/// The standard Result type for Arcturus core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for results whose failure is logged and then dropped.
///
/// Telemetry is noisy: a bad record or a malformed message is reported and
/// skipped, never allowed to stop the stream it arrived on.
pub trait ResultExt<T, E> {
    /// Convert to an Option, logging the error at `warn` with the given context.
    fn into_option_logged(self, context: &str) -> Option<T>;

    /// Inspect the error without consuming the Result.
    #[must_use]
    fn inspect_error<F: FnOnce(&E)>(self, f: F) -> Self;
}

impl<T, E: std::fmt::Display> ResultExt<T, E> for std::result::Result<T, E> {
    fn into_option_logged(self, context: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "{context}");
                None
            }
        }
    }

    fn inspect_error<F: FnOnce(&E)>(self, f: F) -> Self {
        if let Err(ref e) = self {
            f(e);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_option_logged_keeps_ok() {
        let result: Result<u32> = Ok(7);
        assert_eq!(result.into_option_logged("unused"), Some(7));
    }

    #[test]
    fn test_into_option_logged_drops_err() {
        let result: Result<u32> = Err(Error::invalid_record("empty id"));
        assert_eq!(result.into_option_logged("dropping record"), None);
    }

    #[test]
    fn test_inspect_error_sees_error() {
        let mut seen = String::new();
        let result: Result<u32> = Err(Error::invalid_record("empty id"));
        let _ = result.inspect_error(|e| seen = e.to_string());
        assert!(seen.contains("empty id"));
    }
}
