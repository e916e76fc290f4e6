use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReportCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `shelf report`.
pub async fn handle(action: &ReportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = ctx.limit(flags.limit);
    match action {
        ReportCommands::Reservations => {
            output(&ctx.service.recent_reservations(limit).await?, flags.format)
        }
        ReportCommands::Loans => output(&ctx.service.open_loans(limit).await?, flags.format),
        ReportCommands::Returns => output(&ctx.service.returned_loans(limit).await?, flags.format),
    }
}
