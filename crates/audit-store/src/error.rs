//! Database error types for audit-store.

use audit_core::errors::PortError;
use thiserror::Error;

/// Errors from draft store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL query failed or a row could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

impl From<StoreError> for PortError {
    fn from(err: StoreError) -> Self {
        Self::Io(err.to_string())
    }
}
