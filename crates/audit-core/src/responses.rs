//! Result types returned by the session engine.
//!
//! Finalize never collapses per-entry failures into one error: the caller gets
//! a [`FinalizeReport`] naming every unit that succeeded or failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::SyncStage;

/// A violation entry that did not finish syncing during one finalize run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryFailure {
    pub local_id: String,
    pub answer_id: String,
    pub stage: SyncStage,
    pub reason: String,
}

/// An answer whose score push failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreFailure {
    pub answer_id: String,
    pub reason: String,
}

/// Accounting of one finalize run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Scores pushed successfully.
    pub scores_pushed: usize,
    pub score_failures: Vec<ScoreFailure>,
    /// Entries that became remote-created in this run.
    pub violations_synced: usize,
    /// Entries that were already remote-created before this run.
    pub violations_already_synced: usize,
    pub violation_failures: Vec<EntryFailure>,
    /// Local store writes that failed. In-memory state stayed authoritative.
    pub persistence_warnings: usize,
    /// Set when all pending work completed but closing the audit failed.
    pub close_error: Option<String>,
}

impl FinalizeReport {
    /// Whether every score and every entry completed.
    #[must_use]
    pub fn all_pending_work_done(&self) -> bool {
        self.score_failures.is_empty() && self.violation_failures.is_empty()
    }

    #[must_use]
    pub fn failed_entry_ids(&self) -> Vec<&str> {
        self.violation_failures
            .iter()
            .map(|f| f.local_id.as_str())
            .collect()
    }
}

/// Outcome of `finalize_session`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FinalizeOutcome {
    /// Everything synced and the audit is closed.
    Success {
        end_time: DateTime<Utc>,
        report: FinalizeReport,
    },
    /// Some work is still pending. The audit stays open and can be retried.
    Partial { report: FinalizeReport },
}

impl FinalizeOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub const fn report(&self) -> &FinalizeReport {
        match self {
            Self::Success { report, .. } | Self::Partial { report } => report,
        }
    }

    #[must_use]
    pub fn failed_entry_ids(&self) -> Vec<&str> {
        self.report().failed_entry_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_outcome_lists_failed_ids() {
        let outcome = FinalizeOutcome::Partial {
            report: FinalizeReport {
                violations_synced: 1,
                violation_failures: vec![EntryFailure {
                    local_id: "vio-2".into(),
                    answer_id: "aq-1".into(),
                    stage: SyncStage::Upload,
                    reason: "operation timed out".into(),
                }],
                ..FinalizeReport::default()
            },
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_entry_ids(), vec!["vio-2"]);
        assert!(!outcome.report().all_pending_work_done());
    }

    #[test]
    fn outcome_is_tagged_by_status() {
        let outcome = FinalizeOutcome::Partial {
            report: FinalizeReport::default(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "partial");
    }
}
