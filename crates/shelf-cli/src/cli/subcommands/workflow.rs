use clap::Subcommand;

#[derive(Clone, Debug, Subcommand)]
pub enum WorkflowCommands {
    /// List the places a holding may occupy.
    Places,
    /// Print the full workflow definition.
    Show,
}
