use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single catalog item that can be reserved or lent.
///
/// `place` is the holding's current workflow place. Its vocabulary belongs to
/// the configured workflow, so it is kept as a string rather than an enum.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Holding {
    pub id: i64,
    pub identifier: String,
    pub title: String,
    pub place: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
