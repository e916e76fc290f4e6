mod holding;
mod member;
mod report;
mod workflow;

pub use holding::HoldingCommands;
pub use member::MemberCommands;
pub use report::ReportCommands;
pub use workflow::WorkflowCommands;
