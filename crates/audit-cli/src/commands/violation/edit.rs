use audit_core::entities::ViolationEdit;

use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::ViolationEditArgs;
use crate::commands::shared::resume;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    args: &ViolationEditArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut engine = resume(ctx, &args.audit, FileCapture::none()).await?;
    let edits = args.edits();

    // Load the options first so the classification is checked against them.
    if edits
        .iter()
        .any(|edit| matches!(edit, ViolationEdit::SubAnswer(Some(_))))
    {
        let entry = engine
            .violation(&args.local_id)
            .await
            .ok_or_else(|| anyhow::anyhow!("violation {} not found", args.local_id))?;
        engine.sub_answer_options(&entry.answer_id).await?;
    }

    let mut updated = None;
    for edit in edits {
        updated = Some(engine.edit_violation(&args.local_id, edit).await?);
    }
    output(&updated, flags.format)
}
