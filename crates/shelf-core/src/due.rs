//! Due-date policy.
//!
//! The external configuration contract is a single integer lead time in days
//! where an absent value, anything `<= 0`, or the sentinel `9999` all mean
//! "the loan never falls due". Internally that is folded into [`LoanPeriod`]
//! once, at the configuration boundary.

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

/// Configured lead time that means "unlimited loan".
pub const UNLIMITED_DUE_DAYS: i64 = 9999;

/// Longest lead time accepted from configuration. Anything larger would push
/// due dates toward the end of the representable calendar.
pub const MAX_DUE_DAYS: i64 = 1_000_000;

/// How long a loan runs before it falls due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPeriod {
    Days(u32),
    #[default]
    Unlimited,
}

impl LoanPeriod {
    /// Interpret the configured `due_days` value.
    ///
    /// Counts that do not fit in a `u32` are treated as unlimited; run
    /// [`check_due_days`] first to reject them instead.
    #[must_use]
    pub fn from_due_days(due_days: Option<i64>) -> Self {
        match due_days {
            Some(days) if days > 0 && days != UNLIMITED_DUE_DAYS => {
                u32::try_from(days).map_or(Self::Unlimited, Self::Days)
            }
            _ => Self::Unlimited,
        }
    }

    /// Due date for a loan that starts at `base`, or `None` when unlimited.
    #[must_use]
    pub fn due_date(self, base: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Days(days) => base.checked_add_days(Days::new(u64::from(days))),
            Self::Unlimited => None,
        }
    }
}

/// Reject a configured lead time above [`MAX_DUE_DAYS`].
///
/// # Errors
///
/// Returns the reason the value is unusable.
pub fn check_due_days(due_days: Option<i64>) -> Result<(), String> {
    match due_days {
        Some(days) if days > MAX_DUE_DAYS => Err(format!(
            "{days} days is beyond the supported maximum of {MAX_DUE_DAYS}"
        )),
        _ => Ok(()),
    }
}

/// Due date for a loan starting at `base` under the raw configured lead time.
#[must_use]
pub fn due_date(base: DateTime<Utc>, due_days: Option<i64>) -> Option<DateTime<Utc>> {
    LoanPeriod::from_due_days(due_days).due_date(base)
}
