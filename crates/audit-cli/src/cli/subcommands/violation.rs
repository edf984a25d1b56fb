use std::path::PathBuf;

use audit_core::entities::ViolationEdit;
use clap::{ArgGroup, Args, Subcommand};

/// Violation commands. All of them work against the local draft.
#[derive(Clone, Debug, Subcommand)]
pub enum ViolationCommands {
    /// Record a violation for an answer with a photo as evidence.
    Add {
        #[arg(long)]
        audit: String,
        #[arg(long)]
        answer: String,
        /// Photo file to attach. An empty path cancels.
        #[arg(long)]
        photo: PathBuf,
    },
    /// Change the note, resolved flag or classification of a violation.
    Edit(ViolationEditArgs),
    /// Remove a violation that has not been sent yet.
    Rm {
        #[arg(long)]
        audit: String,
        #[arg(long)]
        local_id: String,
    },
    /// List classification options for violations under an answer.
    Options {
        #[arg(long)]
        audit: String,
        #[arg(long)]
        answer: String,
    },
}

#[derive(Clone, Debug, Args)]
#[command(group(
    ArgGroup::new("change")
        .required(true)
        .multiple(true)
        .args(["note", "resolved", "sub_answer", "clear_sub_answer"])
))]
pub struct ViolationEditArgs {
    #[arg(long)]
    pub audit: String,
    #[arg(long)]
    pub local_id: String,
    /// New free-text note.
    #[arg(long)]
    pub note: Option<String>,
    /// Mark the violation resolved (true) or open (false).
    #[arg(long)]
    pub resolved: Option<bool>,
    /// Classification option id.
    #[arg(long, conflicts_with = "clear_sub_answer")]
    pub sub_answer: Option<String>,
    /// Remove the classification.
    #[arg(long)]
    pub clear_sub_answer: bool,
}

impl ViolationEditArgs {
    /// Requested edits in a fixed order: note, resolved, classification.
    #[must_use]
    pub fn edits(&self) -> Vec<ViolationEdit> {
        let mut edits = Vec::new();
        if let Some(note) = &self.note {
            edits.push(ViolationEdit::Note(note.clone()));
        }
        if let Some(resolved) = self.resolved {
            edits.push(ViolationEdit::Resolved(resolved));
        }
        if let Some(sub_answer) = &self.sub_answer {
            edits.push(ViolationEdit::SubAnswer(Some(sub_answer.clone())));
        } else if self.clear_sub_answer {
            edits.push(ViolationEdit::SubAnswer(None));
        }
        edits
    }
}
