//! Error types for incidentio-alert-mcp.
//!
//! # Security Note
//!
//! Error messages are carefully crafted to NEVER include credentials.
//! All error variants that could potentially contain sensitive data
//! use generic descriptions instead of including the actual values.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("{name} environment variable is required")]
    MissingVariable {
        /// Name of the environment variable.
        name: &'static str,
    },

    /// The alert endpoint is not a usable absolute URL.
    #[error("{name} is not a valid http(s) URL: {reason}")]
    InvalidEndpoint {
        /// Name of the environment variable holding the URL.
        name: &'static str,
        /// Why the URL was rejected.
        reason: String,
    },

    /// Settings file could not be read.
    #[error("failed to read settings file: {path}")]
    ReadError {
        /// Path to the settings file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file could not be parsed.
    #[error("failed to parse settings file: {path}")]
    ParseError {
        /// Path to the settings file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Settings file not found.
    #[error("settings file not found: {path}")]
    NotFound {
        /// Path where the settings file was expected.
        path: PathBuf,
    },

    /// Settings validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while delivering an alert to the upstream webhook.
#[derive(Error, Debug)]
pub enum AlertError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (connect, TLS, timeout).
    #[error("failed to send request: {0}")]
    Request(#[source] reqwest::Error),

    /// The webhook answered with a non-2xx status.
    #[error("unexpected status code: {status}")]
    UnexpectedStatus {
        /// Numeric HTTP status.
        status: u16,
    },
}
