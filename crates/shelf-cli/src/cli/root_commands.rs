use clap::{Args, Subcommand};

use crate::cli::subcommands::{HoldingCommands, MemberCommands, ReportCommands, WorkflowCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Catalog holdings.
    Holding {
        #[command(subcommand)]
        action: HoldingCommands,
    },
    /// Library members.
    Member {
        #[command(subcommand)]
        action: MemberCommands,
    },
    /// Put a member in line for a holding.
    Reserve(ReserveArgs),
    /// Lend one or more holdings to a member.
    Checkout(CheckoutArgs),
    /// Take a holding back.
    Checkin(CheckinArgs),
    /// Recent circulation activity.
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
    /// Inspect the configured holding workflow.
    Workflow {
        #[command(subcommand)]
        action: WorkflowCommands,
    },
    /// Print the JSON Schema of a request or response type.
    Schema(SchemaArgs),
    /// Serve the circulation endpoints over HTTP.
    Serve(ServeArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ReserveArgs {
    /// Member identifier.
    pub member: String,
    /// Holding identifier.
    pub holding: String,
    /// Reservation expiry, epoch seconds.
    #[arg(long)]
    pub expiry: Option<i64>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckoutArgs {
    /// Member identifier.
    pub member: String,
    /// Holding identifiers, processed in order.
    #[arg(required = true)]
    pub holdings: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckinArgs {
    /// Holding identifier.
    pub holding: String,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Type name, e.g. `reserve-request` or `loan`. `list` prints the known names.
    pub type_name: String,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,
}
