//! Request routing, independent of the socket layer.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shelf_core::api::{CheckInRequest, CheckoutRequest, INVALID_DATA, ReserveRequest};
use shelf_core::errors::CoreError;
use shelf_db::error::CirculationError;
use shelf_db::service::CirculationService;

use crate::commands::circulation::{check_in_response, checkout_response, reserve_response};

/// Status code and JSON body for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub(crate) fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    fn ok<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self { status: 200, body },
            Err(error) => {
                tracing::error!(%error, "failed to encode response body");
                Self::error(500, "Internal server error")
            }
        }
    }
}

impl From<CirculationError> for ApiResponse {
    fn from(error: CirculationError) -> Self {
        if error.is_client_error() {
            tracing::debug!(%error, "request rejected");
            Self::error(400, &error.to_string())
        } else {
            tracing::error!(%error, "circulation request failed");
            Self::error(500, "Internal server error")
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiResponse> {
    serde_json::from_str(body).map_err(|error| {
        tracing::debug!(%error, "unreadable request body");
        ApiResponse::error(400, INVALID_DATA)
    })
}

fn invalid(error: &CoreError) -> ApiResponse {
    ApiResponse::error(400, &error.to_string())
}

/// Route one request to the circulation service.
pub async fn handle_request(
    service: &CirculationService,
    method: &str,
    path: &str,
    body: &str,
) -> ApiResponse {
    let route = path.trim_end_matches('/');
    if !matches!(
        route,
        "/circulation/reserve" | "/circulation/checkout" | "/circulation/checkin"
    ) {
        return ApiResponse::error(404, "Not found");
    }
    if !method.eq_ignore_ascii_case("POST") {
        return ApiResponse::error(405, "Method not allowed");
    }

    let outcome = match route {
        "/circulation/reserve" => reserve(service, body).await,
        "/circulation/checkout" => checkout(service, body).await,
        _ => check_in(service, body).await,
    };
    outcome.unwrap_or_else(|response| response)
}

async fn reserve(service: &CirculationService, body: &str) -> Result<ApiResponse, ApiResponse> {
    let request = parse::<ReserveRequest>(body)?
        .validate()
        .map_err(|e| invalid(&e))?;
    let response = reserve_response(
        service,
        &request.member_identifier,
        &request.manifestation_identifier,
        request.expiry_date,
    )
    .await?;
    Ok(ApiResponse::ok(&response))
}

async fn checkout(service: &CirculationService, body: &str) -> Result<ApiResponse, ApiResponse> {
    let request = parse::<CheckoutRequest>(body)?
        .validate()
        .map_err(|e| invalid(&e))?;
    let response = checkout_response(
        service,
        &request.member_identifier,
        &request.manifestation_identifiers,
    )
    .await?;
    Ok(ApiResponse::ok(&response))
}

async fn check_in(service: &CirculationService, body: &str) -> Result<ApiResponse, ApiResponse> {
    let holding = parse::<CheckInRequest>(body)?
        .validate()
        .map_err(|e| invalid(&e))?;
    let response = check_in_response(service, &holding).await?;
    Ok(ApiResponse::ok(&response))
}
