//! Status enums and workflow transition names for Shelf.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Historical rows written with the localized vocabulary are still accepted on
//! deserialization through `#[serde(alias = ...)]`; they are always written back
//! in the canonical form.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ReservationStatus
// ---------------------------------------------------------------------------

/// Status of a reservation in a holding's queue.
///
/// ```text
/// waiting → available → completed
///         → completed
///         → cancelled
///           available → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[serde(alias = "待機中")]
    Waiting,
    #[serde(alias = "引換可能")]
    Available,
    #[serde(alias = "キャンセル済")]
    Cancelled,
    #[serde(alias = "完了")]
    Completed,
}

impl ReservationStatus {
    /// Statuses that hold a place in the queue.
    pub const ACTIVE: [Self; 2] = [Self::Waiting, Self::Available];

    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Waiting => &[Self::Available, Self::Completed, Self::Cancelled],
            Self::Available => &[Self::Completed, Self::Cancelled],
            Self::Cancelled | Self::Completed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether the reservation still occupies a place in the queue.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Waiting | Self::Available)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Available => "available",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Status of a loan.
///
/// ```text
/// checked_out → returned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[serde(alias = "貸出中")]
    CheckedOut,
    #[serde(alias = "返却済")]
    Returned,
}

impl LoanStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::CheckedOut => &[Self::Returned],
            Self::Returned => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckedOut => "checked_out",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Workflow transitions the circulation engine drives on a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Reserve,
    CheckOut,
    CheckIn,
}

impl Transition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reserve => "reserve",
            Self::CheckOut => "check_out",
            Self::CheckIn => "check_in",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
