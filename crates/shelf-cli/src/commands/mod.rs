pub mod circulation;
pub mod dispatch;
pub mod holding;
pub mod member;
pub mod report;
pub mod schema;
pub mod serve;
pub mod workflow;
