use clap::{Args, Subcommand};

use crate::cli::subcommands::{AuditCommands, ViolationCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Audit records.
    Audit {
        #[command(subcommand)]
        action: AuditCommands,
    },
    /// Open an audit: make sure every checklist question has an answer record.
    Open(OpenArgs),
    /// Show the local draft of an audit without touching the network.
    Show(AuditArgs),
    /// Set or clear the score of an answer.
    Score(ScoreArgs),
    /// Violations attached to answers.
    Violation {
        #[command(subcommand)]
        action: ViolationCommands,
    },
    /// Push scores and violations, then close the audit if nothing failed.
    Finalize(AuditArgs),
}

/// Arguments for commands that only name an audit.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub audit: String,
}

/// Arguments for `fieldaudit open`.
#[derive(Clone, Debug, Args)]
pub struct OpenArgs {
    #[arg(long)]
    pub audit: String,
    /// Checklist section. Defaults to the section stored with the audit.
    #[arg(long)]
    pub section: Option<String>,
    #[arg(long)]
    pub auditor: Option<String>,
    #[arg(long)]
    pub auditee: Option<String>,
}

/// Arguments for `fieldaudit score`.
#[derive(Clone, Debug, Args)]
pub struct ScoreArgs {
    #[arg(long)]
    pub audit: String,
    #[arg(long)]
    pub answer: String,
    /// Score value as the checklist defines it.
    #[arg(long, required_unless_present = "clear", conflicts_with = "clear")]
    pub value: Option<String>,
    /// Clear the score.
    #[arg(long)]
    pub clear: bool,
}

impl ScoreArgs {
    /// Score to store; `None` clears it.
    #[must_use]
    pub fn score(&self) -> Option<String> {
        if self.clear { None } else { self.value.clone() }
    }
}
