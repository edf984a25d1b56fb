//! Collaborator traits consumed by the sync engine.
//!
//! The engine never talks HTTP, touches a camera, or opens a database
//! itself. It drives these traits, which `audit-remote`, `audit-store` and
//! the CLI implement. Every remote read and record mutation answers with an
//! [`Envelope`], the one normalized response shape the engine understands.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    AnswerRecord, AuditDraft, AuditSession, Employee, QuestionDefinition, Section, SubAnswer,
    ViolationEntry, ViolationMap,
};
use crate::errors::PortError;

// ── Envelope ───────────────────────────────────────────────────────

/// Normalized remote response: did the store report success, and which
/// records came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub items: Vec<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub const fn success(items: Vec<T>) -> Self {
        Self { ok: true, items }
    }

    #[must_use]
    pub const fn failure() -> Self {
        Self {
            ok: false,
            items: Vec::new(),
        }
    }

    /// Unwrap the items, turning a non-ok envelope into `PortError::Rejected`.
    ///
    /// # Errors
    ///
    /// Returns `PortError::Rejected` naming `what` if `ok` is false.
    pub fn into_items(self, what: &str) -> Result<Vec<T>, PortError> {
        if self.ok {
            Ok(self.items)
        } else {
            Err(PortError::Rejected(format!("{what}: store did not report success")))
        }
    }
}

// ── Mutation payloads ──────────────────────────────────────────────

/// Fields sent by `upsert_answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerFields {
    /// Create the record for a question that has none yet. The score starts null.
    Create {
        audit_id: String,
        question_id: String,
        question_text_snapshot: String,
    },
    /// Overwrite the score (null clears it).
    Score { score: Option<String> },
}

/// Fields of a remote violation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationPayload {
    /// Client-generated idempotency key (the entry's `local_id`).
    pub client_ref: String,
    pub answer_id: String,
    pub note: String,
    pub photo_remote_url: String,
    pub resolved: bool,
    pub sub_answer_id: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl ViolationPayload {
    /// Build the create payload for an entry. `None` until the photo is uploaded,
    /// because the record must carry the remote URL.
    #[must_use]
    pub fn from_entry(entry: &ViolationEntry) -> Option<Self> {
        Some(Self {
            client_ref: entry.local_id.clone(),
            answer_id: entry.answer_id.clone(),
            note: entry.note.clone(),
            photo_remote_url: entry.photo_remote_url()?.to_string(),
            resolved: entry.resolved,
            sub_answer_id: entry.sub_answer_id.clone(),
            captured_at: entry.captured_at,
        })
    }
}

/// A violation record as echoed by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub violation_id: String,
}

/// Fields changed on the audit itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSessionUpdate {
    pub end_time: Option<DateTime<Utc>>,
}

// ── Capture ────────────────────────────────────────────────────────

/// Answer to a camera/storage permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Result of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The user backed out. Not an error.
    Cancelled,
    /// A photo was written to this device-local file.
    Captured(PathBuf),
}

// ── Traits ─────────────────────────────────────────────────────────

/// Read-only access to the question catalog, existing answers and the
/// people and sections a new audit can name.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_questions(
        &self,
        section_id: &str,
    ) -> Result<Envelope<QuestionDefinition>, PortError>;

    async fn fetch_answer_records(
        &self,
        audit_id: &str,
    ) -> Result<Envelope<AnswerRecord>, PortError>;

    async fn fetch_sub_answers(&self, question_id: &str)
    -> Result<Envelope<SubAnswer>, PortError>;

    /// Everyone who can be named auditor or auditee.
    async fn fetch_employees(&self) -> Result<Envelope<Employee>, PortError>;

    async fn fetch_sections(&self) -> Result<Envelope<Section>, PortError>;
}

/// Create/update operations against the record store.
#[async_trait]
pub trait MutationClient: Send + Sync {
    async fn create_audit(&self, draft: &AuditDraft) -> Result<Envelope<AuditSession>, PortError>;

    /// Create (`answer_id == None`) or update an answer record.
    async fn upsert_answer(
        &self,
        answer_id: Option<&str>,
        fields: &AnswerFields,
    ) -> Result<Envelope<AnswerRecord>, PortError>;

    async fn create_violation(
        &self,
        payload: &ViolationPayload,
    ) -> Result<Envelope<ViolationRecord>, PortError>;

    /// Upload a photo and return its remote URL.
    async fn upload_photo(&self, local_path: &Path) -> Result<String, PortError>;

    async fn update_audit_session(
        &self,
        audit_id: &str,
        update: &AuditSessionUpdate,
    ) -> Result<Envelope<AuditSession>, PortError>;
}

/// Camera (or any photo source) used when a violation is added.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn request_permission(&self) -> Result<Permission, PortError>;

    async fn capture(&self) -> Result<CaptureOutcome, PortError>;
}

/// Durable per-audit draft state. Every save is a full replace for that audit.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_violations(&self, audit_id: &str, map: &ViolationMap) -> Result<(), PortError>;

    /// Returns an empty map when nothing was ever saved for `audit_id`.
    async fn load_violations(&self, audit_id: &str) -> Result<ViolationMap, PortError>;

    async fn save_answers(&self, audit_id: &str, answers: &[AnswerRecord])
    -> Result<(), PortError>;

    async fn load_answers(&self, audit_id: &str) -> Result<Vec<AnswerRecord>, PortError>;

    async fn save_session(&self, session: &AuditSession) -> Result<(), PortError>;

    async fn load_session(&self, audit_id: &str) -> Result<Option<AuditSession>, PortError>;
}
