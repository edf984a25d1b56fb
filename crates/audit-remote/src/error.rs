//! Record store error types.

use audit_core::errors::PortError;
use thiserror::Error;

/// Errors that can occur when talking to the record store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// The upload endpoint answered without a file name.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The request cannot be expressed against the API.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Whether the same request may succeed if sent again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::Parse(_) | Self::Upload(_) | Self::InvalidRequest(_) | Self::Io(_) => false,
        }
    }
}

impl From<RemoteError> for PortError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Http(e) if e.is_timeout() => Self::Timeout,
            RemoteError::Http(e) if e.is_decode() => Self::Malformed(e.to_string()),
            RemoteError::Http(e) => Self::Unreachable(e.to_string()),
            err @ (RemoteError::RateLimited { .. } | RemoteError::Api { status: 500.., .. }) => {
                Self::Unreachable(err.to_string())
            }
            err @ (RemoteError::Api { .. }
            | RemoteError::Upload(_)
            | RemoteError::InvalidRequest(_)) => Self::Rejected(err.to_string()),
            RemoteError::Parse(msg) => Self::Malformed(msg),
            RemoteError::Io(e) => Self::Io(e.to_string()),
        }
    }
}
