use clap::Subcommand;

/// Audit record commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuditCommands {
    /// Create a new audit in the record store and store its header locally.
    Create {
        /// User performing the audit.
        #[arg(long)]
        auditor: String,
        /// User responsible for the audited area.
        #[arg(long)]
        auditee: String,
        /// Checklist section the audit covers.
        #[arg(long)]
        section: String,
    },
    /// List audits stored on this device.
    List,
    /// List people who can be named auditor or auditee.
    Employees,
    /// List sections an audit can cover.
    Sections,
}
