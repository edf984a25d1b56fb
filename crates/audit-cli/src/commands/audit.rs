use anyhow::Context;
use audit_core::entities::AuditDraft;
use audit_core::time::server_now;

use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuditCommands;
use crate::context::AppContext;
use crate::output::output;

use super::shared::sync_failure;

/// Handle `fieldaudit audit`.
pub async fn handle(
    action: &AuditCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuditCommands::Create {
            auditor,
            auditee,
            section,
        } => {
            ctx.require_remote()?;
            let draft = AuditDraft {
                auditor_id: auditor.clone(),
                auditee_id: auditee.clone(),
                section_id: section.clone(),
                start_time: server_now(),
            };
            let session = audit_sync::create_audit(&ctx.engine(FileCapture::none()), &draft)
                .await
                .map_err(|error| sync_failure(error, "failed to create audit".into()))?;
            output(&session, flags.format)
        }
        AuditCommands::List => {
            let sessions = ctx
                .store
                .list_sessions()
                .await
                .context("failed to read stored audits")?;
            output(&sessions, flags.format)
        }
        AuditCommands::Employees => {
            ctx.require_remote()?;
            let employees = audit_sync::list_employees(&ctx.engine(FileCapture::none()))
                .await
                .map_err(|error| sync_failure(error, "failed to list employees".into()))?;
            output(&employees, flags.format)
        }
        AuditCommands::Sections => {
            ctx.require_remote()?;
            let sections = audit_sync::list_sections(&ctx.engine(FileCapture::none()))
                .await
                .map_err(|error| sync_failure(error, "failed to list sections".into()))?;
            output(&sections, flags.format)
        }
    }
}
