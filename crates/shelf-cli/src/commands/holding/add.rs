use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    identifier: &str,
    title: &str,
    place: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let holding = ctx.service.register_holding(identifier, title, place).await?;
    output(&holding, flags.format)
}
