// src/error.rs
//! Failure values surfaced to whatever front end drives the core.
//!
//! Nothing here is retried. Every variant carries enough context (url or
//! endpoint, page index, status, server text) to diagnose without re-running.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not reach auth endpoint {url}: {message}")]
    Transport { url: String, message: String },

    #[error("login rejected by {url} (HTTP {status}): {body}")]
    Rejected { url: String, status: u16, body: String },

    #[error("login response from {url} is not valid JSON: {body}")]
    MalformedResponse { url: String, body: String },

    #[error("no token found in login response from {url}: {body}")]
    MissingToken { url: String, body: String },
}

impl AuthError {
    /// The server answered but refused us; prompting for new credentials makes sense.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthError::Rejected { .. } | AuthError::MissingToken { .. })
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint}: request for page {page} failed: {message}")]
    Transport { endpoint: String, page: u32, message: String },

    #[error("{endpoint}: token rejected on page {page} (HTTP 401), log in again")]
    Unauthorized { endpoint: String, page: u32 },

    #[error("{endpoint}: server error on page {page} (HTTP {status}): {body}")]
    Server { endpoint: String, page: u32, status: u16, body: String },

    #[error("{endpoint}: cannot determine page count from first page")]
    ExtentUnknown { endpoint: String },

    #[error("{endpoint}: page {page} is not valid JSON: {message}")]
    MalformedResponse { endpoint: String, page: u32, message: String },
}

impl FetchError {
    pub fn requires_reauth(&self) -> bool {
        matches!(self, FetchError::Unauthorized { .. })
    }

    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Unauthorized { endpoint, .. }
            | FetchError::Server { endpoint, .. }
            | FetchError::ExtentUnknown { endpoint }
            | FetchError::MalformedResponse { endpoint, .. } => endpoint,
        }
    }
}

/// Transport-level failure: the request never produced an HTTP status.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Export-side failures (file writing).
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("path exists but is not a directory: {0}")]
    NotADirectory(String),
}
