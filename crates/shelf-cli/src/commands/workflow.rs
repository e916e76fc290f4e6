use crate::cli::GlobalFlags;
use crate::cli::subcommands::WorkflowCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `shelf workflow`.
pub fn handle(action: &WorkflowCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        WorkflowCommands::Places => {
            let workflow = ctx.service.workflow()?;
            output(&workflow.places(), flags.format)
        }
        WorkflowCommands::Show => output(&ctx.config.workflow, flags.format),
    }
}
