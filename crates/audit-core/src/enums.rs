//! Status enums for the audit lifecycle.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Submission state of an audit session.
///
/// ```text
/// editing → submitting → finalized
///                      → editing (any pending work failed)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Editing,
    Submitting,
    Finalized,
}

impl SessionState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Editing => &[Self::Submitting],
            Self::Submitting => &[Self::Finalized, Self::Editing],
            Self::Finalized => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether local edits (scores, violations) are accepted in this state.
    #[must_use]
    pub const fn accepts_edits(self) -> bool {
        matches!(self, Self::Editing)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncStage
// ---------------------------------------------------------------------------

/// Step of the per-entry finalize protocol at which a violation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    /// The photo upload did not produce a remote URL.
    Upload,
    /// The remote violation record could not be created.
    Create,
}

impl SyncStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SessionState::Editing, SessionState::Submitting, true)]
    #[case(SessionState::Editing, SessionState::Finalized, false)]
    #[case(SessionState::Submitting, SessionState::Finalized, true)]
    #[case(SessionState::Submitting, SessionState::Editing, true)]
    #[case(SessionState::Finalized, SessionState::Editing, false)]
    #[case(SessionState::Finalized, SessionState::Submitting, false)]
    fn session_state_transitions(
        #[case] from: SessionState,
        #[case] to: SessionState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn only_editing_accepts_edits() {
        assert!(SessionState::Editing.accepts_edits());
        assert!(!SessionState::Submitting.accepts_edits());
        assert!(!SessionState::Finalized.accepts_edits());
    }

    #[test]
    fn session_state_serializes_snake_case() {
        let json = serde_json::to_string(&SessionState::Finalized).unwrap();
        assert_eq!(json, "\"finalized\"");
        assert_eq!(SessionState::default(), SessionState::Editing);
    }
}
