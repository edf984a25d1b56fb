use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::commands::shared::resume;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    audit_id: &str,
    answer_id: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    ctx.require_remote()?;
    let mut engine = resume(ctx, audit_id, FileCapture::none()).await?;
    let options = engine.sub_answer_options(answer_id).await?;
    output(&options, flags.format)
}
