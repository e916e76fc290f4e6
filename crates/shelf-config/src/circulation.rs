//! Circulation policy settings.

use serde::{Deserialize, Serialize};
use shelf_core::due::LoanPeriod;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CirculationConfig {
    /// Loan lead time in days. Absent, `<= 0`, or `9999` means loans never
    /// fall due.
    #[serde(default)]
    pub due_days: Option<i64>,
}

impl CirculationConfig {
    /// The configured lead time as an explicit loan period.
    pub fn loan_period(&self) -> LoanPeriod {
        LoanPeriod::from_due_days(self.due_days)
    }
}
