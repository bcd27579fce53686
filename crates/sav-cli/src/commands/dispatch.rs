use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Profile { action } => commands::profile::handle(&action, ctx, flags).await,
        Commands::Ingest(args) => commands::ingest::handle(&args, ctx, flags).await,
        Commands::Search(args) => commands::search::handle(&args, ctx, flags).await,
        Commands::Feedback(args) => commands::feedback::handle(&args, ctx, flags).await,
        Commands::Venue { action } => commands::venue::handle(&action, ctx, flags).await,
        Commands::Funding { action } => commands::funding::handle(&action, ctx, flags).await,
        Commands::Notify { action } => commands::notify::handle(&action, ctx, flags).await,
        Commands::Webhook { action } => commands::webhook::handle(&action, ctx, flags).await,
        Commands::Optimize(args) => commands::optimize::handle(&args, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Events => commands::events::handle(ctx, flags),
        Commands::Init(_) => unreachable!("init is pre-dispatched in main"),
    }
}
