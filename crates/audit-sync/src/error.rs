//! Engine error types.

use audit_core::enums::SessionState;
use audit_core::errors::{CoreError, PortError};
use thiserror::Error;

/// Errors surfaced by the session engine.
///
/// Per-entry finalize failures (`Upload`, `RemoteCreate`) never escape
/// `finalize_session`; they are folded into the report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The catalog or answer list could not be fetched. Opening can be retried.
    #[error("catalog fetch failed: {0}")]
    CatalogFetch(#[source] PortError),

    /// The capture collaborator refused access.
    #[error("capture denied: {0}")]
    CaptureDenied(String),

    /// The capture collaborator failed after permission was granted.
    #[error("capture failed: {0}")]
    Capture(#[source] PortError),

    /// A photo upload did not produce a remote URL.
    #[error("upload of {local_id} failed: {source}")]
    Upload {
        local_id: String,
        #[source]
        source: PortError,
    },

    /// A remote create or update did not complete.
    #[error("remote write for {unit} failed: {source}")]
    RemoteCreate {
        unit: String,
        #[source]
        source: PortError,
    },

    /// The operation would break a queue invariant. Nothing was changed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The local draft store could not be read.
    #[error("persistence failed: {0}")]
    Persistence(#[source] PortError),

    /// Lookup of an answer, violation, sub-answer or stored audit failed.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// The session is not in a state that allows the operation.
    #[error("cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    /// A core helper failed (for example, local id generation).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SyncError {
    pub(crate) fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }

    /// Whether repeating the same call later can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::CatalogFetch(source)
            | Self::Capture(source)
            | Self::Upload { source, .. }
            | Self::RemoteCreate { source, .. } => source.is_retryable(),
            Self::Persistence(_) => true,
            Self::CaptureDenied(_)
            | Self::InvariantViolation(_)
            | Self::NotFound { .. }
            | Self::InvalidTransition { .. }
            | Self::Core(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_timeouts_are_retryable() {
        assert!(SyncError::CatalogFetch(PortError::Timeout).is_retryable());
        assert!(!SyncError::CatalogFetch(PortError::Rejected("status ERROR".into())).is_retryable());
    }

    #[test]
    fn transition_error_names_state() {
        let err = SyncError::InvalidTransition {
            operation: "edit violation",
            state: SessionState::Finalized,
        };
        assert_eq!(
            err.to_string(),
            "cannot edit violation while session is finalized"
        );
    }
}
