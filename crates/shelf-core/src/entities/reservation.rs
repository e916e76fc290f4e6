use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ReservationStatus;

/// A member's place in line for a holding.
///
/// Timestamps are epoch seconds. Queue order is `reserved_at` ascending, ties
/// broken by `id` ascending.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Reservation {
    pub id: i64,
    pub holding_id: i64,
    pub member_id: i64,
    pub reserved_at: i64,
    pub expiry_date: Option<i64>,
    pub status: ReservationStatus,
}

/// A reservation joined with the identifiers a report needs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub holding_identifier: String,
    pub holding_title: String,
    pub member_identifier: String,
    pub member_name: String,
}
