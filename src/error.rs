// src/error.rs
//! Application error types with structured error handling.
//!
//! Two vocabularies live here. `AppError` covers failures that stop the
//! adapter from being constructed at all (bad credentials format, unreadable
//! mapping files, HTTP client construction). `ApiFailure` is the out-of-band
//! diagnostic the API client records when a remote call produced no data;
//! it is never returned as an `Err`.

use std::fmt;
use thiserror::Error;

use crate::api::Command;

/// What kind of failure the remote call ran into.
///
/// The remote service does not publish structured error codes, so the HTTP
/// status is the code. A request that never produced a status (DNS, TLS,
/// connection reset) is reported as `Transport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// The service answered with a non-200 status.
    HttpStatus(u16),
    /// No HTTP status was received.
    Transport,
}

impl ApiErrorCode {
    /// Create from an HTTP status code.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// The numeric form, `0` for transport failures.
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::HttpStatus(code) => *code,
            Self::Transport => 0,
        }
    }

    /// Whether the service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus(404))
    }

    /// Whether the credentials were rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::HttpStatus(401) | Self::HttpStatus(403))
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Transport => write!(f, "transport"),
        }
    }
}

/// Diagnostic state left behind by a failed API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub command: Command,
    pub code: ApiErrorCode,
    pub message: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.command, self.code, self.message)
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize response cache at {path}: {source}")]
    CacheUnavailable {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid mapping configuration: {0}")]
    InvalidMapping(String),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
