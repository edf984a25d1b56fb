use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Audit { action } => commands::audit::handle(&action, ctx, flags).await,
        Commands::Open(args) => commands::open::run(&args, ctx, flags).await,
        Commands::Show(args) => commands::show::run(&args.audit, ctx, flags).await,
        Commands::Score(args) => commands::score::run(&args, ctx, flags).await,
        Commands::Violation { action } => commands::violation::handle(&action, ctx, flags).await,
        Commands::Finalize(args) => commands::finalize::run(&args.audit, ctx, flags).await,
    }
}
