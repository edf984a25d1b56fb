//! Durable queue of captured violations for one audit.
//!
//! The queue owns the audit's [`ViolationMap`] and writes the whole map to
//! the draft store after every mutation, including the sync flag commits
//! made during finalize. A failed write is logged and counted; the in-memory
//! map stays authoritative and the next successful write catches the store
//! up.

use std::sync::Arc;

use chrono::Utc;

use audit_core::entities::{ViolationEdit, ViolationEntry, ViolationMap};
use audit_core::ids::{PREFIX_VIOLATION, generate_local_id};
use audit_core::ports::{CaptureDevice, CaptureOutcome, DraftStore, Permission};

use crate::error::SyncError;

pub struct ViolationQueue {
    audit_id: String,
    entries: ViolationMap,
    store: Arc<dyn DraftStore>,
    persistence_failures: usize,
}

impl ViolationQueue {
    /// Load the stored map for `audit_id` (empty when nothing was saved).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Persistence`] if the store cannot be read. Starting
    /// empty instead would overwrite the stored drafts on the next save.
    pub async fn load(audit_id: &str, store: Arc<dyn DraftStore>) -> Result<Self, SyncError> {
        let mut entries = store
            .load_violations(audit_id)
            .await
            .map_err(SyncError::Persistence)?;
        entries.retain(|_, list| !list.is_empty());
        tracing::debug!(
            audit_id,
            entries = entries.values().map(Vec::len).sum::<usize>(),
            "violation queue loaded"
        );
        Ok(Self {
            audit_id: audit_id.to_string(),
            entries,
            store,
            persistence_failures: 0,
        })
    }

    // ── Reads ──────────────────────────────────────────────────────

    #[must_use]
    pub fn audit_id(&self) -> &str {
        &self.audit_id
    }

    #[must_use]
    pub const fn entries(&self) -> &ViolationMap {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, local_id: &str) -> Option<&ViolationEntry> {
        self.entries
            .values()
            .flatten()
            .find(|entry| entry.local_id == local_id)
    }

    /// Every entry, grouped by answer, in capture order.
    pub fn iter(&self) -> impl Iterator<Item = &ViolationEntry> {
        self.entries.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store writes that failed since the queue was loaded.
    #[must_use]
    pub const fn persistence_failures(&self) -> usize {
        self.persistence_failures
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Capture a photo for `answer_id` and append the new entry.
    ///
    /// Returns `Ok(None)` when the user cancels.
    ///
    /// # Errors
    ///
    /// - [`SyncError::CaptureDenied`] if permission is refused.
    /// - [`SyncError::Capture`] if the device fails.
    /// - [`SyncError::Core`] if a local id cannot be generated.
    pub async fn capture(
        &mut self,
        device: &dyn CaptureDevice,
        answer_id: &str,
    ) -> Result<Option<ViolationEntry>, SyncError> {
        match device.request_permission().await {
            Ok(Permission::Granted) => {}
            Ok(Permission::Denied) => {
                return Err(SyncError::CaptureDenied(
                    "camera or storage permission refused".into(),
                ));
            }
            Err(e) => return Err(SyncError::CaptureDenied(e.to_string())),
        }

        let path = match device.capture().await.map_err(SyncError::Capture)? {
            CaptureOutcome::Cancelled => {
                tracing::debug!(audit_id = %self.audit_id, answer_id, "capture cancelled");
                return Ok(None);
            }
            CaptureOutcome::Captured(path) => path,
        };

        let local_id = generate_local_id(PREFIX_VIOLATION)?;
        let entry = ViolationEntry::captured(local_id, answer_id, path, Utc::now());
        self.entries
            .entry(answer_id.to_string())
            .or_default()
            .push(entry.clone());
        tracing::info!(
            audit_id = %self.audit_id,
            answer_id,
            local_id = %entry.local_id,
            "violation captured"
        );
        self.persist().await;
        Ok(Some(entry))
    }

    /// Apply a user edit to one entry and return the updated entry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if no entry has `local_id`.
    pub async fn update(
        &mut self,
        local_id: &str,
        edit: ViolationEdit,
    ) -> Result<ViolationEntry, SyncError> {
        let entry = self.find_mut(local_id)?;
        entry.apply(edit);
        let updated = entry.clone();
        self.persist().await;
        Ok(updated)
    }

    /// Remove an entry that has not been created remotely.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotFound`] if no entry has `local_id`.
    /// - [`SyncError::InvariantViolation`] if the entry already exists
    ///   remotely. The queue is left unchanged.
    pub async fn delete(&mut self, local_id: &str) -> Result<ViolationEntry, SyncError> {
        let (answer_id, idx) = self
            .position(local_id)
            .ok_or_else(|| SyncError::not_found("violation", local_id))?;
        let Some(list) = self.entries.get_mut(&answer_id) else {
            return Err(SyncError::not_found("violation", local_id));
        };
        if list[idx].is_remote_created() {
            return Err(SyncError::InvariantViolation(format!(
                "violation {local_id} already exists remotely and cannot be deleted"
            )));
        }

        let removed = list.remove(idx);
        if list.is_empty() {
            self.entries.remove(&answer_id);
        }
        tracing::info!(audit_id = %self.audit_id, local_id, "violation removed");
        self.persist().await;
        Ok(removed)
    }

    /// Commit the remote photo URL of an entry and persist.
    ///
    /// Returns `false` if the entry was already uploaded (the stored URL wins).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if no entry has `local_id`.
    pub async fn mark_uploaded(&mut self, local_id: &str, url: String) -> Result<bool, SyncError> {
        let changed = self.find_mut(local_id)?.mark_uploaded(url);
        if changed {
            self.persist().await;
        }
        Ok(changed)
    }

    /// Commit that the remote violation record exists and persist.
    ///
    /// Returns `false` if it was already recorded.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if no entry has `local_id`.
    pub async fn mark_created(&mut self, local_id: &str) -> Result<bool, SyncError> {
        let changed = self.find_mut(local_id)?.mark_remote_created();
        if changed {
            self.persist().await;
        }
        Ok(changed)
    }

    // ── Internals ──────────────────────────────────────────────────

    fn position(&self, local_id: &str) -> Option<(String, usize)> {
        self.entries.iter().find_map(|(answer_id, list)| {
            list.iter()
                .position(|entry| entry.local_id == local_id)
                .map(|idx| (answer_id.clone(), idx))
        })
    }

    fn find_mut(&mut self, local_id: &str) -> Result<&mut ViolationEntry, SyncError> {
        self.entries
            .values_mut()
            .flatten()
            .find(|entry| entry.local_id == local_id)
            .ok_or_else(|| SyncError::not_found("violation", local_id))
    }

    /// Write the whole map. Returns whether the write succeeded.
    async fn persist(&mut self) -> bool {
        match self.store.save_violations(&self.audit_id, &self.entries).await {
            Ok(()) => true,
            Err(e) => {
                self.persistence_failures += 1;
                tracing::warn!(
                    audit_id = %self.audit_id,
                    error = %e,
                    "failed to persist violations; keeping in-memory state"
                );
                false
            }
        }
    }
}
