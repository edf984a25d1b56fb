use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Violations of one audit, grouped by owning `answer_id`, each list in
/// capture order.
pub type ViolationMap = BTreeMap<String, Vec<ViolationEntry>>;

/// A locally captured non-compliance record with photo evidence.
///
/// The two sync flags are set-once: `photo_remote_url` goes from `None` to
/// `Some` exactly once and `remote_created` goes from `false` to `true`
/// exactly once. They are private so only [`mark_uploaded`] and
/// [`mark_remote_created`] can touch them.
///
/// [`mark_uploaded`]: ViolationEntry::mark_uploaded
/// [`mark_remote_created`]: ViolationEntry::mark_remote_created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationEntry {
    pub local_id: String,
    pub answer_id: String,
    pub photo_local_path: PathBuf,
    photo_remote_url: Option<String>,
    pub note: String,
    pub resolved: bool,
    pub sub_answer_id: Option<String>,
    pub captured_at: DateTime<Utc>,
    remote_created: bool,
}

impl ViolationEntry {
    /// A freshly captured entry: no note, unresolved, nothing synced.
    #[must_use]
    pub fn captured(
        local_id: impl Into<String>,
        answer_id: impl Into<String>,
        photo_local_path: impl Into<PathBuf>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            local_id: local_id.into(),
            answer_id: answer_id.into(),
            photo_local_path: photo_local_path.into(),
            photo_remote_url: None,
            note: String::new(),
            resolved: false,
            sub_answer_id: None,
            captured_at,
            remote_created: false,
        }
    }

    /// Re-apply persisted sync flags when rehydrating from the local store.
    #[must_use]
    pub fn with_sync_state(mut self, photo_remote_url: Option<String>, remote_created: bool) -> Self {
        if let Some(url) = photo_remote_url {
            self.mark_uploaded(url);
        }
        if remote_created {
            self.mark_remote_created();
        }
        self
    }

    #[must_use]
    pub fn photo_remote_url(&self) -> Option<&str> {
        self.photo_remote_url.as_deref()
    }

    #[must_use]
    pub const fn is_uploaded(&self) -> bool {
        self.photo_remote_url.is_some()
    }

    #[must_use]
    pub const fn is_remote_created(&self) -> bool {
        self.remote_created
    }

    /// Record the remote photo URL. Returns `false` (and keeps the existing
    /// URL) if the photo was already uploaded.
    pub fn mark_uploaded(&mut self, url: impl Into<String>) -> bool {
        if self.photo_remote_url.is_some() {
            return false;
        }
        self.photo_remote_url = Some(url.into());
        true
    }

    /// Record that the remote violation exists. Returns `false` if it was
    /// already recorded.
    pub const fn mark_remote_created(&mut self) -> bool {
        if self.remote_created {
            return false;
        }
        self.remote_created = true;
        true
    }

    /// Apply a user edit. Edits never touch the sync flags.
    pub fn apply(&mut self, edit: ViolationEdit) {
        match edit {
            ViolationEdit::Note(note) => self.note = note,
            ViolationEdit::Resolved(resolved) => self.resolved = resolved,
            ViolationEdit::SubAnswer(sub_answer_id) => self.sub_answer_id = sub_answer_id,
        }
    }
}

/// A user edit of one mutable violation field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ViolationEdit {
    Note(String),
    Resolved(bool),
    SubAnswer(Option<String>),
}
