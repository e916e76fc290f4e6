mod add;
mod get;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HoldingCommands;
use crate::context::AppContext;

/// Handle `shelf holding`.
pub async fn handle(action: &HoldingCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        HoldingCommands::Add {
            identifier,
            title,
            place,
        } => add::run(identifier, title, place.as_deref(), ctx, flags).await,
        HoldingCommands::Get { identifier } => get::run(identifier, ctx, flags).await,
    }
}
