//! Domain error types for modelbench.
//!
//! Typed errors at module boundaries replace string-encoded errors and
//! enable structured error handling via pattern matching.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from model invocation.
///
/// Embedded in `anyhow::Error` at the suite level so callers can downcast:
/// `e.downcast_ref::<ProviderError>()`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Failed to read response body: {0}")]
    ResponseReadError(String),

    #[error("Failed to parse response JSON: {0}")]
    JsonParseError(String),

    #[error("Rate limited (status {status}): retry after {retry_after_ms}ms")]
    RateLimited { status: u16, retry_after_ms: u64 },

    #[error("Authentication failed (status {status}): {message}")]
    AuthError { status: u16, message: String },

    #[error("Server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// The HTTP call succeeded but the body did not match the provider's
    /// documented response shape (missing text or usage fields).
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from reading or writing the config file.
///
/// `run` and `aggregate` tolerate these (warn and fall back to the default
/// catalog), but `init` surfaces them so a broken file is never silently
/// replaced by defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Aggregation errors
// ---------------------------------------------------------------------------

/// Errors from loading and reducing run documents.
///
/// Only document-level failures are fatal: the run count is a hard
/// precondition, so a missing or unparsable run file terminates the
/// aggregation. Record-level problems (missing records, malformed
/// evaluations, unknown model keys) are absorbed by the reducers.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to read run document {path}: {source}")]
    RunRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse run document {path}: {source}")]
    RunParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let e = ProviderError::HttpError("connection refused".into());
        assert_eq!(e.to_string(), "HTTP request failed: connection refused");
    }

    #[test]
    fn test_provider_error_rate_limited() {
        let e = ProviderError::RateLimited {
            status: 429,
            retry_after_ms: 5000,
        };
        assert!(e.to_string().contains("429"));
        assert!(e.to_string().contains("5000"));
    }

    #[test]
    fn test_provider_error_downcast() {
        let anyhow_err: anyhow::Error = ProviderError::AuthError {
            status: 401,
            message: "invalid key".into(),
        }
        .into();
        let downcasted = anyhow_err.downcast_ref::<ProviderError>();
        assert!(downcasted.is_some());
        assert!(matches!(
            downcasted.unwrap(),
            ProviderError::AuthError { status: 401, .. }
        ));
    }

    #[test]
    fn test_aggregate_error_includes_path() {
        let e = AggregateError::RunRead {
            path: PathBuf::from("comparison_results_run3.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("comparison_results_run3.json"));
    }
}
