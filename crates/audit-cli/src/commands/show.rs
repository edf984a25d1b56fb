use crate::capture::FileCapture;
use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

use super::shared::resume;
use super::types::{SessionDetailResponse, SessionResponse};

pub async fn run(audit_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = resume(ctx, audit_id, FileCapture::none()).await?;
    let violations = engine.violations().await.into_values().flatten().collect();

    output(
        &SessionDetailResponse {
            summary: SessionResponse {
                session: engine.session().clone(),
                state: engine.state(),
                answers: engine.answers().to_vec(),
            },
            violations,
        },
        flags.format,
    )
}
