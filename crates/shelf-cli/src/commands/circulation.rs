//! `shelf reserve`, `shelf checkout`, `shelf checkin`.
//!
//! The response builders are shared with the HTTP routes so both surfaces
//! report the same shapes.

use shelf_core::api::{CheckInResponse, CheckoutResponse, ReserveResponse, STATUS_SUCCESS};
use shelf_db::error::CirculationError;
use shelf_db::service::CirculationService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{CheckinArgs, CheckoutArgs, ReserveArgs};
use crate::context::AppContext;
use crate::output::output;

/// Format of `checkedInAt` in check-in responses.
const CHECKED_IN_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

pub(crate) async fn reserve_response(
    service: &CirculationService,
    member: &str,
    holding: &str,
    expiry: Option<i64>,
) -> Result<ReserveResponse, CirculationError> {
    let reservation = service.reserve(member, holding, expiry).await?;
    Ok(ReserveResponse {
        status: STATUS_SUCCESS.to_string(),
        reservation_id: reservation.id,
        reservation_status: reservation.status,
    })
}

pub(crate) async fn checkout_response(
    service: &CirculationService,
    member: &str,
    holdings: &[String],
) -> Result<CheckoutResponse, CirculationError> {
    let loans = service.checkout(member, holdings).await?;
    Ok(CheckoutResponse {
        status: STATUS_SUCCESS.to_string(),
        checkout_count: loans.len(),
    })
}

pub(crate) async fn check_in_response(
    service: &CirculationService,
    holding: &str,
) -> Result<CheckInResponse, CirculationError> {
    let loan = service.check_in(holding).await?;
    let member_identifier = match &loan {
        Some(loan) => service
            .find_member_by_id(loan.member_id)
            .await?
            .map(|member| member.identifier),
        None => None,
    };
    Ok(CheckInResponse {
        status: STATUS_SUCCESS.to_string(),
        checked_in: loan.is_some(),
        manifestation_identifier: holding.trim().to_string(),
        member_identifier,
        checked_in_at: loan
            .and_then(|loan| loan.checked_in_at)
            .map(|at| at.format(CHECKED_IN_AT_FORMAT).to_string()),
    })
}

pub async fn reserve(args: &ReserveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = reserve_response(&ctx.service, &args.member, &args.holding, args.expiry).await?;
    output(&response, flags.format)
}

pub async fn checkout(args: &CheckoutArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = checkout_response(&ctx.service, &args.member, &args.holdings).await?;
    output(&response, flags.format)
}

pub async fn check_in(args: &CheckinArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = check_in_response(&ctx.service, &args.holding).await?;
    output(&response, flags.format)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use shelf_core::due::LoanPeriod;
    use shelf_core::enums::ReservationStatus;
    use shelf_core::workflow::WorkflowRegistry;

    use super::*;

    async fn service() -> CirculationService {
        let svc = CirculationService::new_local(
            ":memory:",
            WorkflowRegistry::with_default(),
            LoanPeriod::Days(14),
        )
        .await
        .unwrap();
        svc.register_member("M1", "Member One", None).await.unwrap();
        svc.register_member("M2", "Member Two", None).await.unwrap();
        svc.register_holding("H1", "Dune", None).await.unwrap();
        svc.register_holding("H2", "Emma", None).await.unwrap();
        svc
    }

    #[tokio::test]
    async fn reserve_reports_waiting_reservation() {
        let svc = service().await;
        let resp = reserve_response(&svc, "M1", "H1", None).await.unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(resp.reservation_status, ReservationStatus::Waiting);
    }

    #[tokio::test]
    async fn checkout_counts_loans() {
        let svc = service().await;
        let holdings = vec!["H1".to_string(), "H2".to_string()];
        let resp = checkout_response(&svc, "M1", &holdings).await.unwrap();
        assert_eq!(resp.checkout_count, 2);
    }

    #[tokio::test]
    async fn check_in_names_the_borrower() {
        let svc = service().await;
        checkout_response(&svc, "M2", &["H1".to_string()]).await.unwrap();
        let resp = check_in_response(&svc, "H1").await.unwrap();
        assert!(resp.checked_in);
        assert_eq!(resp.manifestation_identifier, "H1");
        assert_eq!(resp.member_identifier.as_deref(), Some("M2"));
        assert_eq!(resp.checked_in_at.map(|s| s.len()), Some(16));
    }

    #[tokio::test]
    async fn check_in_of_never_lent_holding_is_not_checked_in() {
        let svc = service().await;
        let resp = check_in_response(&svc, "H2").await.unwrap();
        assert!(!resp.checked_in);
        assert_eq!(resp.member_identifier, None);
        assert_eq!(resp.checked_in_at, None);
    }
}
