//! Circulation engine: reserve, checkout, and check-in.
//!
//! Each operation runs in one `BEGIN IMMEDIATE` transaction. The ledger
//! (reservations and loans) is the source of truth; the holding's workflow
//! place follows it on a best-effort basis. A transition whose guard refuses
//! is skipped and logged, never raised.

use chrono::{DateTime, Utc};
use libsql::Connection;
use tracing::{debug, info, warn};

use shelf_core::entities::{Holding, Loan, Reservation};
use shelf_core::enums::{ReservationStatus, Transition};
use shelf_core::errors::CoreError;

use crate::error::CirculationError;
use crate::repos::{holding, loan, member, reservation};
use crate::service::CirculationService;
use crate::txn;

fn required<'a>(what: &str, value: &'a str) -> Result<&'a str, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{what} identifier is required")));
    }
    Ok(value)
}

impl CirculationService {
    /// Put a member in line for a holding.
    ///
    /// Reserving is allowed whatever the holding's availability; the new
    /// reservation always starts `waiting`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown member or holding, `Conflict` if the member
    /// already has a waiting or available reservation for this holding.
    pub async fn reserve(
        &self,
        member_identifier: &str,
        holding_identifier: &str,
        expiry_date: Option<i64>,
    ) -> Result<Reservation, CirculationError> {
        let member_identifier = required("Member", member_identifier)?;
        let holding_identifier = required("Manifestation", holding_identifier)?;

        let conn = self.db().session().await?;
        let tx = txn::begin(&conn).await?;
        let outcome = self
            .reserve_in(&tx, member_identifier, holding_identifier, expiry_date)
            .await;
        let created = txn::finish(tx, outcome).await?;

        info!(
            reservation_id = created.id,
            member = member_identifier,
            holding = holding_identifier,
            "reservation created"
        );
        Ok(created)
    }

    async fn reserve_in(
        &self,
        conn: &Connection,
        member_identifier: &str,
        holding_identifier: &str,
        expiry_date: Option<i64>,
    ) -> Result<Reservation, CirculationError> {
        let member = member::require(conn, member_identifier).await?;
        let mut holding = holding::require(conn, holding_identifier).await?;

        if let Some(existing) = reservation::active_for_member(conn, holding.id, member.id).await? {
            return Err(CoreError::Conflict(format!(
                "Member {member_identifier} already holds reservation {} ({}) for {holding_identifier}",
                existing.id, existing.status
            ))
            .into());
        }

        let now = self.now();
        let created =
            reservation::insert(conn, holding.id, member.id, now.timestamp(), expiry_date).await?;
        self.drive(conn, &mut holding, Transition::Reserve, now).await?;
        Ok(created)
    }

    /// Lend one or more holdings to a member.
    ///
    /// Holdings are processed in input order. The batch is all-or-nothing:
    /// the first failure rolls back every loan staged earlier in the call.
    /// A member's own waiting or available reservation for a holding is
    /// completed by the checkout.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty batch, `NotFound` for an unknown member or
    /// holding, `Conflict` if a holding is already out (including a holding
    /// listed twice in the same batch).
    pub async fn checkout(
        &self,
        member_identifier: &str,
        holding_identifiers: &[String],
    ) -> Result<Vec<Loan>, CirculationError> {
        let member_identifier = required("Member", member_identifier)?;
        if holding_identifiers.is_empty() {
            return Err(CoreError::Validation(
                "At least one manifestation identifier is required".into(),
            )
            .into());
        }

        let conn = self.db().session().await?;
        let tx = txn::begin(&conn).await?;
        let outcome = self
            .checkout_in(&tx, member_identifier, holding_identifiers)
            .await;
        let loans = txn::finish(tx, outcome).await?;

        info!(
            member = member_identifier,
            holdings = ?holding_identifiers,
            count = loans.len(),
            "checkout committed"
        );
        Ok(loans)
    }

    async fn checkout_in(
        &self,
        conn: &Connection,
        member_identifier: &str,
        holding_identifiers: &[String],
    ) -> Result<Vec<Loan>, CirculationError> {
        let member = member::require(conn, member_identifier).await?;
        let now = self.now();
        let due_date = self.loan_period().due_date(now);

        let mut loans = Vec::with_capacity(holding_identifiers.len());
        for identifier in holding_identifiers {
            let mut holding = holding::require(conn, identifier).await?;
            if loan::open_for_holding(conn, holding.id).await?.is_some() {
                return Err(CoreError::Conflict(format!(
                    "Manifestation already checked out: {identifier}"
                ))
                .into());
            }
            if self.workflow()?.can(&holding, Transition::CheckIn) {
                warn!(
                    holding = %holding.identifier,
                    place = %holding.place,
                    "holding place says checked out but the ledger has no open loan"
                );
            }

            let created = loan::insert(conn, holding.id, member.id, now, due_date).await?;
            if let Some(own) = reservation::active_for_member(conn, holding.id, member.id).await? {
                let completed =
                    reservation::advance(conn, &own, ReservationStatus::Completed).await?;
                debug!(reservation_id = completed.id, holding = %holding.identifier, "reservation completed by checkout");
            }
            self.drive(conn, &mut holding, Transition::CheckOut, now).await?;
            loans.push(created);
        }
        Ok(loans)
    }

    /// Take a holding back.
    ///
    /// Closes the open loan if there is one; otherwise returns the latest
    /// loan untouched, so a repeated check-in answers the same record. In
    /// both cases the head of the waiting queue, if any, is promoted to
    /// `available`.
    ///
    /// Returns `None` only when the holding has never been lent.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown holding.
    pub async fn check_in(
        &self,
        holding_identifier: &str,
    ) -> Result<Option<Loan>, CirculationError> {
        let holding_identifier = required("Manifestation", holding_identifier)?;

        let conn = self.db().session().await?;
        let tx = txn::begin(&conn).await?;
        let outcome = self.check_in_in(&tx, holding_identifier).await;
        let found = txn::finish(tx, outcome).await?;

        match &found {
            Some(l) => info!(holding = holding_identifier, loan_id = l.id, status = %l.status, "check-in committed"),
            None => info!(holding = holding_identifier, "check-in found no loan"),
        }
        Ok(found)
    }

    async fn check_in_in(
        &self,
        conn: &Connection,
        holding_identifier: &str,
    ) -> Result<Option<Loan>, CirculationError> {
        let mut holding = holding::require(conn, holding_identifier).await?;
        let now = self.now();

        let found = match loan::open_for_holding(conn, holding.id).await? {
            Some(open) => Some(loan::mark_returned(conn, &open, now).await?),
            None => {
                if self.workflow()?.can(&holding, Transition::CheckIn) {
                    warn!(
                        holding = %holding.identifier,
                        place = %holding.place,
                        "holding place says checked out but the ledger has no open loan"
                    );
                }
                loan::latest_for_holding(conn, holding.id).await?
            }
        };
        self.drive(conn, &mut holding, Transition::CheckIn, now).await?;

        if let Some(head) = reservation::oldest_waiting(conn, holding.id).await? {
            let promoted = reservation::advance(conn, &head, ReservationStatus::Available).await?;
            info!(
                reservation_id = promoted.id,
                holding = %holding.identifier,
                "queue head promoted to available"
            );
            self.drive(conn, &mut holding, Transition::Reserve, now).await?;
        }
        Ok(found)
    }

    /// Fire a workflow transition if its guard allows it and persist the new place.
    ///
    /// Returns whether the transition fired.
    async fn drive(
        &self,
        conn: &Connection,
        holding: &mut Holding,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<bool, CirculationError> {
        let workflow = self.workflow()?;
        if !workflow.can(holding, transition) {
            debug!(
                holding = %holding.identifier,
                place = %holding.place,
                %transition,
                "workflow guard refused transition, skipping"
            );
            return Ok(false);
        }
        workflow.apply(holding, transition)?;
        holding::update_place(conn, holding.id, &holding.place, now).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{T0, at, seeded_service, seeded_service_with};
    use pretty_assertions::assert_eq;
    use shelf_core::due::LoanPeriod;
    use shelf_core::enums::LoanStatus;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    async fn place_of(svc: &CirculationService, identifier: &str) -> String {
        svc.get_holding(identifier).await.unwrap().place
    }

    async fn status_of(svc: &CirculationService, reservation_id: i64, holding: &str) -> ReservationStatus {
        svc.reservations_for_holding(holding)
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.id == reservation_id)
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn reserve_creates_waiting_reservation_stamped_now() {
        let svc = seeded_service().await;
        let created = svc.reserve("M1", "H1", None).await.unwrap();
        assert_eq!(created.status, ReservationStatus::Waiting);
        assert_eq!(created.reserved_at, T0);
        assert_eq!(created.expiry_date, None);
        assert_eq!(place_of(&svc, "H1").await, "reserved");
    }

    #[tokio::test]
    async fn checkout_completes_the_members_reservation() {
        let (svc, _clock) = seeded_service_with(LoanPeriod::Days(14)).await;
        let reservation = svc.reserve("M1", "H1", None).await.unwrap();

        let loans = svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        assert_eq!(loans.len(), 1);
        let loan = &loans[0];
        assert_eq!(loan.status, LoanStatus::CheckedOut);
        assert_eq!(loan.checked_out_at, at(T0));
        assert_eq!(loan.due_date, Some(at(T0 + 14 * 86_400)));
        assert_eq!(status_of(&svc, reservation.id, "H1").await, ReservationStatus::Completed);
        assert_eq!(place_of(&svc, "H1").await, "checked_out");
    }

    #[tokio::test]
    async fn second_checkout_of_an_open_holding_conflicts() {
        let svc = seeded_service().await;
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        let err = svc.checkout("M2", &ids(&["H1"])).await.unwrap_err();
        assert!(matches!(err, CirculationError::Core(CoreError::Conflict(_))));
        assert_eq!(err.to_string(), "Manifestation already checked out: H1");
        assert_eq!(svc.loans_for_holding("H1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn redundant_check_in_promotes_the_queue_head() {
        let svc = seeded_service().await;
        svc.reserve("M1", "H1", None).await.unwrap();
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        let first = svc.check_in("H1").await.unwrap().unwrap();
        assert_eq!(first.status, LoanStatus::Returned);
        assert_eq!(place_of(&svc, "H1").await, "available");

        let m3 = svc.reserve("M3", "H1", None).await.unwrap();
        let second = svc.check_in("H1").await.unwrap().unwrap();
        assert_eq!(second, first);
        assert_eq!(status_of(&svc, m3.id, "H1").await, ReservationStatus::Available);
        assert_eq!(place_of(&svc, "H1").await, "reserved");
    }

    #[tokio::test]
    async fn unlimited_period_leaves_due_date_empty() {
        let (svc, _clock) = seeded_service_with(LoanPeriod::from_due_days(Some(9999))).await;
        let loans = svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        assert_eq!(loans[0].due_date, None);
        let stored = svc.open_loan_for_holding("H1").await.unwrap().unwrap();
        assert_eq!(stored.due_date, None);
    }

    #[tokio::test]
    async fn check_in_promotes_earliest_reservation() {
        let (svc, clock) = seeded_service_with(LoanPeriod::Unlimited).await;
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();

        clock.set(100);
        let r1 = svc.reserve("M2", "H1", None).await.unwrap();
        clock.set(200);
        let r2 = svc.reserve("M3", "H1", None).await.unwrap();
        assert_eq!((r1.reserved_at, r2.reserved_at), (100, 200));

        clock.set(300);
        svc.check_in("H1").await.unwrap();
        assert_eq!(status_of(&svc, r1.id, "H1").await, ReservationStatus::Available);
        assert_eq!(status_of(&svc, r2.id, "H1").await, ReservationStatus::Waiting);
        let head = svc.oldest_waiting_reservation("H1").await.unwrap().unwrap();
        assert_eq!(head.id, r2.id);
    }

    #[tokio::test]
    async fn repeated_check_in_returns_the_same_loan() {
        let (svc, clock) = seeded_service_with(LoanPeriod::Days(7)).await;
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        clock.advance(3_600);
        let first = svc.check_in("H1").await.unwrap().unwrap();
        assert_eq!(first.checked_in_at, Some(at(T0 + 3_600)));

        clock.advance(3_600);
        let second = svc.check_in("H1").await.unwrap().unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn check_in_of_never_lent_holding_is_none() {
        let svc = seeded_service().await;
        assert_eq!(svc.check_in("H2").await.unwrap(), None);
        assert_eq!(place_of(&svc, "H2").await, "available");
    }

    #[tokio::test]
    async fn batch_checkout_is_all_or_nothing() {
        let svc = seeded_service().await;
        let err = svc
            .checkout("M1", &ids(&["H1", "H2", "H404", "H3"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Manifestation not found: H404");

        for holding in ["H1", "H2", "H3"] {
            assert!(svc.loans_for_holding(holding).await.unwrap().is_empty());
            assert_eq!(place_of(&svc, holding).await, "available");
        }
    }

    #[tokio::test]
    async fn duplicate_identifier_in_batch_conflicts() {
        let svc = seeded_service().await;
        let err = svc
            .checkout("M1", &ids(&["H2", "H1", "H2"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Manifestation already checked out: H2");
        assert!(svc.open_loans(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_checkout_keeps_input_order() {
        let svc = seeded_service().await;
        let loans = svc.checkout("M2", &ids(&["H3", "H1"])).await.unwrap();
        let h3 = svc.get_holding("H3").await.unwrap();
        let h1 = svc.get_holding("H1").await.unwrap();
        assert_eq!(
            loans.iter().map(|l| l.holding_id).collect::<Vec<_>>(),
            vec![h3.id, h1.id]
        );
    }

    #[tokio::test]
    async fn failed_checkout_keeps_reservation_active() {
        let svc = seeded_service().await;
        let reservation = svc.reserve("M1", "H1", None).await.unwrap();
        assert!(svc.checkout("M1", &ids(&["H1", "H404"])).await.is_err());
        assert_eq!(status_of(&svc, reservation.id, "H1").await, ReservationStatus::Waiting);
        assert_eq!(place_of(&svc, "H1").await, "reserved");
    }

    #[tokio::test]
    async fn checkout_only_consumes_the_members_own_reservation() {
        let svc = seeded_service().await;
        let m2 = svc.reserve("M2", "H1", None).await.unwrap();
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        assert_eq!(status_of(&svc, m2.id, "H1").await, ReservationStatus::Waiting);
    }

    #[tokio::test]
    async fn second_active_reservation_by_same_member_conflicts() {
        let svc = seeded_service().await;
        svc.reserve("M1", "H1", None).await.unwrap();
        let err = svc.reserve("M1", "H1", None).await.unwrap_err();
        assert!(matches!(err, CirculationError::Core(CoreError::Conflict(_))), "{err}");
        assert_eq!(svc.count_active_reservations_for_member("M1").await.unwrap(), 1);

        // Another member may still queue, and a completed reservation frees the slot.
        svc.reserve("M2", "H1", None).await.unwrap();
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        svc.reserve("M1", "H1", None).await.unwrap();
    }

    #[tokio::test]
    async fn reserving_a_checked_out_holding_is_allowed() {
        let svc = seeded_service().await;
        svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        let queued = svc.reserve("M2", "H1", Some(T0 + 86_400)).await.unwrap();
        assert_eq!(queued.status, ReservationStatus::Waiting);
        assert_eq!(queued.expiry_date, Some(T0 + 86_400));
        assert_eq!(place_of(&svc, "H1").await, "checked_out");
    }

    #[tokio::test]
    async fn unknown_member_or_holding_is_not_found() {
        let svc = seeded_service().await;
        let err = svc.reserve("M404", "H1", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Member not found: M404");
        let err = svc.reserve("M1", "H404", None).await.unwrap_err();
        assert_eq!(err.to_string(), "Manifestation not found: H404");
        let err = svc.check_in("H404").await.unwrap_err();
        assert!(err.is_client_error());
        assert!(svc.recent_reservations(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_input_is_a_validation_error() {
        let svc = seeded_service().await;
        for err in [
            svc.reserve(" ", "H1", None).await.unwrap_err(),
            svc.checkout("M1", &[]).await.unwrap_err(),
            svc.check_in("").await.unwrap_err(),
        ] {
            assert!(matches!(err, CirculationError::Core(CoreError::Validation(_))), "{err}");
        }
    }

    #[tokio::test]
    async fn refused_transitions_do_not_fail_operations() {
        let svc = seeded_service().await;
        let h1 = svc.get_holding("H1").await.unwrap();
        {
            let conn = svc.db().session().await.unwrap();
            // Out of sync on purpose: the workflow thinks H1 is out, the ledger does not.
            holding::update_place(&conn, h1.id, "checked_out", at(T0))
                .await
                .unwrap();
        }

        svc.reserve("M1", "H1", None).await.unwrap();
        assert_eq!(place_of(&svc, "H1").await, "checked_out");
        let loans = svc.checkout("M1", &ids(&["H1"])).await.unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(place_of(&svc, "H1").await, "checked_out");
    }
}
