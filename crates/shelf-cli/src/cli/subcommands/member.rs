use clap::Subcommand;

/// Member commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MemberCommands {
    /// Register a member.
    Add {
        identifier: String,
        #[arg(long)]
        name: String,
        /// Membership expiry, YYYY-MM-DD.
        #[arg(long)]
        expiry: Option<String>,
    },
    /// Get a member and their active reservation count.
    Get { identifier: String },
}
