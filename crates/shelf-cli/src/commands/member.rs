mod add;
mod get;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MemberCommands;
use crate::context::AppContext;

/// Handle `shelf member`.
pub async fn handle(action: &MemberCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        MemberCommands::Add {
            identifier,
            name,
            expiry,
        } => add::run(identifier, name, expiry.as_deref(), ctx, flags).await,
        MemberCommands::Get { identifier } => get::run(identifier, ctx, flags).await,
    }
}
