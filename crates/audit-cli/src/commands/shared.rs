use anyhow::Context;
use audit_sync::{AuditSessionEngine, SyncError};

use crate::capture::FileCapture;
use crate::context::AppContext;

/// Rebuild the engine for `audit_id` from the local draft store.
pub async fn resume(
    ctx: &AppContext,
    audit_id: &str,
    capture: FileCapture,
) -> anyhow::Result<AuditSessionEngine> {
    match AuditSessionEngine::resume(ctx.engine(capture), audit_id).await {
        Ok(engine) => Ok(engine),
        Err(SyncError::NotFound { .. }) => Err(anyhow::anyhow!(
            "audit {audit_id} has no local draft. Run 'fieldaudit open --audit {audit_id}' first."
        )),
        Err(error) => {
            Err(error).with_context(|| format!("failed to load local draft of audit {audit_id}"))
        }
    }
}

/// Wrap an engine error with `what`, noting when the same command may work
/// on a second try.
pub fn sync_failure(error: SyncError, what: String) -> anyhow::Error {
    let message = if error.is_retryable() {
        format!("{what} (temporary failure, run the command again)")
    } else {
        what
    };
    anyhow::Error::new(error).context(message)
}
