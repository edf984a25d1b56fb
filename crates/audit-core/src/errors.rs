//! Cross-cutting error types.
//!
//! `CoreError` covers failures raised by core helpers. `PortError` is the
//! single error type every collaborator trait returns; concrete clients and
//! stores convert their own errors into it at the crate boundary.

use thiserror::Error;

/// Errors raised by core helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The OS random source failed while generating a local ID.
    #[error("random source unavailable: {0}")]
    Random(String),
}

/// Failure reported by a collaborator (remote client, capture device, store).
#[derive(Debug, Error)]
pub enum PortError {
    /// The call did not complete within its deadline. Always retryable.
    #[error("operation timed out")]
    Timeout,

    /// The collaborator could not be reached (network down, DNS, refused).
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// The collaborator answered but did not report success.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The collaborator answered with a payload that could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Local I/O failed (file read, database write).
    #[error("I/O failure: {0}")]
    Io(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PortError {
    /// Whether retrying the same call later can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unreachable(_))
    }
}
