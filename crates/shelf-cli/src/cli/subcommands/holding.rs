use clap::Subcommand;

/// Catalog holding commands.
#[derive(Clone, Debug, Subcommand)]
pub enum HoldingCommands {
    /// Register a holding.
    Add {
        identifier: String,
        #[arg(long)]
        title: String,
        /// Starting workflow place (defaults to the workflow's initial place).
        #[arg(long)]
        place: Option<String>,
    },
    /// Get a holding with its queue and loan history.
    Get { identifier: String },
}
