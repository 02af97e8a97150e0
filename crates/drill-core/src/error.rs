//! Error types shared across the drill crates.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parse error.
    #[error("Parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Errors from the BI server's HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response status.
    #[error("Request to {endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            endpoint: "/api/action/row/delete".to_string(),
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request to /api/action/row/delete failed with status 403: forbidden"
        );
        assert_eq!(ConfigError::NoConfigDir.to_string(), "Config directory not found");
    }
}
