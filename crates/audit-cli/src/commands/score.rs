use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScoreArgs;
use crate::context::AppContext;
use crate::output::output;

use super::shared::resume;
use super::types::ScoreResponse;

/// Scores are stored locally first; the push is best-effort and repeated by
/// `finalize`, so this works offline.
pub async fn run(args: &ScoreArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut engine = resume(ctx, &args.audit, FileCapture::none()).await?;
    let score = args.score();
    let pushed = engine.set_score(&args.answer, score.clone()).await?;

    output(
        &ScoreResponse {
            answer_id: args.answer.clone(),
            score,
            pushed,
        },
        flags.format,
    )
}
