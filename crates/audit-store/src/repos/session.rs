//! Session header repository.

use audit_core::entities::AuditSession;

use crate::AuditStore;
use crate::error::StoreError;
use crate::helpers::{format_datetime, get_opt_string, parse_optional_datetime};

fn row_to_session(row: &libsql::Row) -> Result<AuditSession, StoreError> {
    Ok(AuditSession {
        audit_id: row.get::<String>(0)?,
        section_id: row.get::<String>(1)?,
        auditor_id: get_opt_string(row, 2)?,
        auditee_id: get_opt_string(row, 3)?,
        start_time: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        end_time: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
    })
}

impl AuditStore {
    /// Insert or replace the header of one audit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    pub async fn put_session(&self, session: &AuditSession) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO audit_sessions
                 (audit_id, section_id, auditor_id, auditee_id, start_time, end_time, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))",
                libsql::params![
                    session.audit_id.as_str(),
                    session.section_id.as_str(),
                    session.auditor_id.as_deref(),
                    session.auditee_id.as_deref(),
                    session.start_time.as_ref().map(format_datetime),
                    session.end_time.as_ref().map(format_datetime),
                ],
            )
            .await?;
        Ok(())
    }

    /// Fetch the stored header of one audit, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row cannot be decoded.
    pub async fn get_session(&self, audit_id: &str) -> Result<Option<AuditSession>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT audit_id, section_id, auditor_id, auditee_id, start_time, end_time
                 FROM audit_sessions WHERE audit_id = ?1",
                [audit_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    /// List every stored audit, most recently touched first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row cannot be decoded.
    pub async fn list_sessions(&self) -> Result<Vec<AuditSession>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT audit_id, section_id, auditor_id, auditee_id, start_time, end_time
                 FROM audit_sessions ORDER BY updated_at DESC, audit_id",
                (),
            )
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_session(&row)?);
        }
        Ok(sessions)
    }
}
