use std::path::Path;

use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::commands::shared::resume;
use crate::commands::types::CaptureResponse;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    audit_id: &str,
    answer_id: &str,
    photo: &Path,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut engine = resume(ctx, audit_id, FileCapture::new(photo)).await?;
    let response = match engine.add_violation(answer_id).await? {
        Some(violation) => CaptureResponse::Captured { violation },
        None => CaptureResponse::Cancelled,
    };
    output(&response, flags.format)
}
