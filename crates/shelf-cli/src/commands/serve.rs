use std::sync::Arc;

use crate::cli::root_commands::ServeArgs;
use crate::context::AppContext;
use crate::server;

/// Handle `shelf serve`. Runs until the process is stopped.
pub async fn handle(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let bind = args.bind.as_deref().unwrap_or(&ctx.config.server.bind);
    server::serve(Arc::clone(&ctx.service), bind).await
}
