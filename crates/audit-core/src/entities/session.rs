use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inspection of a section, tied to an auditor and an auditee.
///
/// `audit_id` is assigned by the record store when the audit is created and
/// never changes afterwards. `end_time` stays `None` until finalize succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditSession {
    pub audit_id: String,
    pub section_id: String,
    pub auditor_id: Option<String>,
    pub auditee_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl AuditSession {
    /// A session known only by its identifiers (auditor/auditee unknown locally).
    #[must_use]
    pub fn new(audit_id: impl Into<String>, section_id: impl Into<String>) -> Self {
        Self {
            audit_id: audit_id.into(),
            section_id: section_id.into(),
            auditor_id: None,
            auditee_id: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Whether the audit has been closed remotely.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Fields submitted when creating a new audit remotely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditDraft {
    pub auditor_id: String,
    pub auditee_id: String,
    pub section_id: String,
    pub start_time: DateTime<Utc>,
}
