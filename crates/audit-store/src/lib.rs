//! # audit-store
//!
//! libSQL draft store for offline audit sessions.
//!
//! Holds everything an auditor produced on the device that the record store
//! may not have yet: the session header, the answer records with their local
//! scores, and the violation map with its sync flags. Every save replaces all
//! rows of one audit inside a transaction, so a crash mid-write leaves the
//! previous snapshot intact.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

mod draft;

use std::path::Path;

use error::StoreError;
use libsql::Builder;
use tokio::sync::Mutex;

/// Handle to the local draft database.
///
/// Writes go through an internal lock: `SQLite` allows one open transaction per
/// connection, and the engine saves from several tasks.
pub struct AuditStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_lock: Mutex<()>,
}

impl AuditStore {
    /// Open (or create) a local draft database at `path`.
    ///
    /// Pass `":memory:"` for a throwaway database. Runs migrations on open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations fail.
    pub async fn open_local(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Migration(format!("create {}: {e}", parent.display())))?;
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let store = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
        };
        store.run_migrations().await?;
        tracing::debug!(path = %path.display(), "draft store opened");
        Ok(store)
    }

    /// Open an in-memory store. Used by tests and dry runs.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if migrations fail.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open_local(":memory:").await
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
