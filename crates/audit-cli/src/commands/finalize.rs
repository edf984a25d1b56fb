use anyhow::bail;
use audit_core::responses::FinalizeOutcome;

use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

use super::shared::resume;

/// Prints the outcome either way. A partial outcome exits non-zero after
/// printing, so scripts can retry.
pub async fn run(audit_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.require_remote()?;
    let mut engine = resume(ctx, audit_id, FileCapture::none()).await?;
    let outcome = engine.finalize_session().await?;
    output(&outcome, flags.format)?;

    if let FinalizeOutcome::Partial { report } = &outcome {
        if let Some(close_error) = &report.close_error {
            bail!("audit {audit_id} is still open: closing failed ({close_error})");
        }
        bail!(
            "audit {audit_id} is still open: {} violation(s) and {} score(s) pending",
            report.violation_failures.len(),
            report.score_failures.len()
        );
    }
    Ok(())
}
