use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::commands::shared::resume;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    audit_id: &str,
    local_id: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut engine = resume(ctx, audit_id, FileCapture::none()).await?;
    let removed = engine.remove_violation(local_id).await?;
    output(&removed, flags.format)
}
