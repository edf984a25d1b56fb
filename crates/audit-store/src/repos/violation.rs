//! Violation draft repository.
//!
//! The sync flags (`photo_remote_url`, `remote_created`) are stored with the
//! entry so a restart resumes finalize where it stopped.

use std::path::PathBuf;

use audit_core::entities::{ViolationEntry, ViolationMap};

use crate::AuditStore;
use crate::error::StoreError;
use crate::helpers::{format_datetime, get_bool, get_opt_string, parse_datetime};
use crate::repos::position;

fn row_to_violation(row: &libsql::Row) -> Result<ViolationEntry, StoreError> {
    let mut entry = ViolationEntry::captured(
        row.get::<String>(0)?,
        row.get::<String>(1)?,
        PathBuf::from(row.get::<String>(2)?),
        parse_datetime(&row.get::<String>(7)?)?,
    )
    .with_sync_state(get_opt_string(row, 3)?, get_bool(row, 8)?);
    entry.note = row.get::<String>(4)?;
    entry.resolved = get_bool(row, 5)?;
    entry.sub_answer_id = get_opt_string(row, 6)?;
    Ok(entry)
}

impl AuditStore {
    /// Replace the whole violation map of `audit_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any statement fails; the transaction is then
    /// rolled back and the previous snapshot stays.
    pub async fn replace_violations(
        &self,
        audit_id: &str,
        map: &ViolationMap,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let tx = self.conn.transaction().await?;
        tx.execute(
            "DELETE FROM violation_drafts WHERE audit_id = ?1",
            [audit_id],
        )
        .await?;
        for (answer_id, entries) in map {
            for (idx, entry) in entries.iter().enumerate() {
                tx.execute(
                    "INSERT INTO violation_drafts
                     (audit_id, local_id, answer_id, position, photo_local_path, photo_remote_url,
                      note, resolved, sub_answer_id, captured_at, remote_created)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    libsql::params![
                        audit_id,
                        entry.local_id.as_str(),
                        answer_id.as_str(),
                        position(idx),
                        entry.photo_local_path.to_string_lossy().into_owned(),
                        entry.photo_remote_url(),
                        entry.note.as_str(),
                        i64::from(entry.resolved),
                        entry.sub_answer_id.as_deref(),
                        format_datetime(&entry.captured_at),
                        i64::from(entry.is_remote_created()),
                    ],
                )
                .await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    /// The stored violation map of `audit_id`. Empty when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row cannot be decoded.
    pub async fn violation_map(&self, audit_id: &str) -> Result<ViolationMap, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT local_id, answer_id, photo_local_path, photo_remote_url, note, resolved,
                        sub_answer_id, captured_at, remote_created
                 FROM violation_drafts WHERE audit_id = ?1
                 ORDER BY answer_id, position",
                [audit_id],
            )
            .await?;
        let mut map = ViolationMap::new();
        while let Some(row) = rows.next().await? {
            let entry = row_to_violation(&row)?;
            map.entry(entry.answer_id.clone()).or_default().push(entry);
        }
        Ok(map)
    }
}
