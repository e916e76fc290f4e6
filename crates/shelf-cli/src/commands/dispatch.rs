use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Holding { action } => commands::holding::handle(&action, ctx, flags).await,
        Commands::Member { action } => commands::member::handle(&action, ctx, flags).await,
        Commands::Reserve(args) => commands::circulation::reserve(&args, ctx, flags).await,
        Commands::Checkout(args) => commands::circulation::checkout(&args, ctx, flags).await,
        Commands::Checkin(args) => commands::circulation::check_in(&args, ctx, flags).await,
        Commands::Report { action } => commands::report::handle(&action, ctx, flags).await,
        Commands::Workflow { action } => commands::workflow::handle(&action, ctx, flags),
        Commands::Serve(args) => commands::serve::handle(&args, ctx).await,
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}
