use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::LoanStatus;

/// A record of a holding lent to a member. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Loan {
    pub id: i64,
    pub holding_id: i64,
    pub member_id: i64,
    pub checked_out_at: DateTime<Utc>,
    /// `None` means the loan never falls due.
    pub due_date: Option<DateTime<Utc>>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::CheckedOut
    }
}

/// A loan joined with the identifiers a report needs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub holding_identifier: String,
    pub holding_title: String,
    pub member_identifier: String,
    pub member_name: String,
}
