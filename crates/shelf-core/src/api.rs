//! Request and response shapes for the circulation request surface.
//!
//! Field names are camelCase on the wire. Request fields are all optional at
//! the serde level so that a missing field becomes a `400 Invalid data` from
//! [`validate`](ReserveRequest::validate) rather than a parse failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ReservationStatus;
use crate::errors::CoreError;

/// Error message for a request that is missing required fields.
pub const INVALID_DATA: &str = "Invalid data";

/// Value of the `status` field in every success body.
pub const STATUS_SUCCESS: &str = "success";

fn invalid_data() -> CoreError {
    CoreError::Validation(INVALID_DATA.to_string())
}

/// Treat absent and blank identifiers alike.
fn required(value: Option<&str>) -> Result<String, CoreError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(invalid_data()),
    }
}

/// Epoch seconds, sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum EpochSeconds {
    Number(i64),
    Text(String),
}

impl EpochSeconds {
    /// # Errors
    ///
    /// Returns `CoreError::Validation("Invalid data")` for text that is not an integer.
    pub fn seconds(&self) -> Result<i64, CoreError> {
        match self {
            Self::Number(secs) => Ok(*secs),
            Self::Text(text) => text.trim().parse().map_err(|_| invalid_data()),
        }
    }
}

/// Body of `POST /circulation/reserve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    pub member_identifier: Option<String>,
    pub manifestation_identifier: Option<String>,
    pub expiry_date: Option<EpochSeconds>,
}

/// A reserve request with its required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReserve {
    pub member_identifier: String,
    pub manifestation_identifier: String,
    pub expiry_date: Option<i64>,
}

impl ReserveRequest {
    /// # Errors
    ///
    /// Returns `CoreError::Validation("Invalid data")` if an identifier is
    /// missing or blank, or the expiry is not an integer.
    pub fn validate(&self) -> Result<ValidReserve, CoreError> {
        Ok(ValidReserve {
            member_identifier: required(self.member_identifier.as_deref())?,
            manifestation_identifier: required(self.manifestation_identifier.as_deref())?,
            expiry_date: self
                .expiry_date
                .as_ref()
                .map(EpochSeconds::seconds)
                .transpose()?,
        })
    }
}

/// One identifier or a list of them; both are accepted for checkout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum IdentifierList {
    One(String),
    Many(Vec<String>),
}

impl IdentifierList {
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// Body of `POST /circulation/checkout`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub member_identifier: Option<String>,
    pub manifestation_identifiers: Option<IdentifierList>,
}

/// A checkout request with its required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub member_identifier: String,
    pub manifestation_identifiers: Vec<String>,
}

impl CheckoutRequest {
    /// # Errors
    ///
    /// Returns `CoreError::Validation("Invalid data")` if the member is missing or
    /// no holding identifiers are given. Blank entries in the list are kept and
    /// reported as not found by the engine.
    pub fn validate(&self) -> Result<ValidCheckout, CoreError> {
        let member_identifier = required(self.member_identifier.as_deref())?;
        let manifestation_identifiers = self
            .manifestation_identifiers
            .clone()
            .map(IdentifierList::into_vec)
            .filter(|ids| !ids.is_empty() && !(ids.len() == 1 && ids[0].trim().is_empty()))
            .ok_or_else(invalid_data)?;
        Ok(ValidCheckout {
            member_identifier,
            manifestation_identifiers,
        })
    }
}

/// Body of `POST /circulation/checkin`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub manifestation_identifier: Option<String>,
}

impl CheckInRequest {
    /// # Errors
    ///
    /// Returns `CoreError::Validation("Invalid data")` if the identifier is missing or blank.
    pub fn validate(&self) -> Result<String, CoreError> {
        required(self.manifestation_identifier.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReserveResponse {
    pub status: String,
    pub reservation_id: i64,
    pub reservation_status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub status: String,
    pub checkout_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub status: String,
    pub checked_in: bool,
    pub manifestation_identifier: String,
    pub member_identifier: Option<String>,
    /// `%Y-%m-%d %H:%M`, UTC.
    pub checked_in_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn reserve_request_reads_camel_case() {
        let req: ReserveRequest = serde_json::from_value(json!({
            "memberIdentifier": "M1",
            "manifestationIdentifier": "H1",
            "expiryDate": 1_800_000_000
        }))
        .unwrap();
        let valid = req.validate().unwrap();
        assert_eq!(valid.member_identifier, "M1");
        assert_eq!(valid.manifestation_identifier, "H1");
        assert_eq!(valid.expiry_date, Some(1_800_000_000));
    }

    #[test]
    fn numeric_string_expiry_is_accepted() {
        let req: ReserveRequest = serde_json::from_value(json!({
            "memberIdentifier": "M1",
            "manifestationIdentifier": "H1",
            "expiryDate": " 1800000000 "
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap().expiry_date, Some(1_800_000_000));
    }

    #[test]
    fn non_numeric_expiry_is_invalid_data() {
        let req: ReserveRequest = serde_json::from_value(json!({
            "memberIdentifier": "M1",
            "manifestationIdentifier": "H1",
            "expiryDate": "next week"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap_err().to_string(), INVALID_DATA);
    }

    #[test]
    fn blank_identifier_is_invalid_data() {
        let req = ReserveRequest {
            member_identifier: Some("  ".into()),
            manifestation_identifier: Some("H1".into()),
            expiry_date: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), INVALID_DATA);
    }

    #[test]
    fn checkout_accepts_single_identifier() {
        let req: CheckoutRequest = serde_json::from_value(json!({
            "memberIdentifier": "M1",
            "manifestationIdentifiers": "H1"
        }))
        .unwrap();
        assert_eq!(req.validate().unwrap().manifestation_identifiers, vec!["H1"]);
    }

    #[test]
    fn checkout_keeps_duplicates_in_order() {
        let req: CheckoutRequest = serde_json::from_value(json!({
            "memberIdentifier": "M1",
            "manifestationIdentifiers": ["H2", "H1", "H2"]
        }))
        .unwrap();
        assert_eq!(
            req.validate().unwrap().manifestation_identifiers,
            vec!["H2", "H1", "H2"]
        );
    }

    #[test]
    fn checkout_without_holdings_is_invalid() {
        for body in [
            json!({"memberIdentifier": "M1"}),
            json!({"memberIdentifier": "M1", "manifestationIdentifiers": []}),
            json!({"memberIdentifier": "M1", "manifestationIdentifiers": ""}),
        ] {
            let req: CheckoutRequest = serde_json::from_value(body).unwrap();
            assert!(req.validate().is_err());
        }
    }

    #[test]
    fn check_in_response_writes_camel_case() {
        let resp = CheckInResponse {
            status: STATUS_SUCCESS.into(),
            checked_in: true,
            manifestation_identifier: "H1".into(),
            member_identifier: Some("M1".into()),
            checked_in_at: Some("2026-01-01 10:00".into()),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["checkedIn"], json!(true));
        assert_eq!(value["memberIdentifier"], json!("M1"));
        assert_eq!(value["checkedInAt"], json!("2026-01-01 10:00"));
    }
}
