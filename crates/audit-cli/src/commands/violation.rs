mod add;
mod edit;
mod options;
mod rm;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ViolationCommands;
use crate::context::AppContext;

/// Handle `fieldaudit violation`.
pub async fn handle(
    action: &ViolationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ViolationCommands::Add {
            audit,
            answer,
            photo,
        } => add::run(audit, answer, photo, ctx, flags).await,
        ViolationCommands::Edit(args) => edit::run(args, ctx, flags).await,
        ViolationCommands::Rm { audit, local_id } => rm::run(audit, local_id, ctx, flags).await,
        ViolationCommands::Options { audit, answer } => {
            options::run(audit, answer, ctx, flags).await
        }
    }
}
