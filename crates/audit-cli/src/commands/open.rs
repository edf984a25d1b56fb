use anyhow::Context;
use audit_core::entities::AuditSession;
use audit_core::ports::DraftStore;
use audit_sync::AuditSessionEngine;

use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::OpenArgs;
use crate::context::AppContext;
use crate::output::output;

use super::shared::sync_failure;
use super::types::SessionResponse;

pub async fn run(args: &OpenArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.require_remote()?;

    let section_id = match &args.section {
        Some(section) => section.clone(),
        None => ctx
            .store
            .load_session(&args.audit)
            .await
            .context("failed to read local draft")?
            .map(|stored| stored.section_id)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "audit {} was never opened on this device; pass --section",
                    args.audit
                )
            })?,
    };

    let mut session = AuditSession::new(args.audit.clone(), section_id);
    session.auditor_id.clone_from(&args.auditor);
    session.auditee_id.clone_from(&args.auditee);

    let engine = AuditSessionEngine::open(ctx.engine(FileCapture::none()), session)
        .await
        .map_err(|error| sync_failure(error, format!("failed to open audit {}", args.audit)))?;

    output(
        &SessionResponse {
            session: engine.session().clone(),
            state: engine.state(),
            answers: engine.answers().to_vec(),
        },
        flags.format,
    )
}
