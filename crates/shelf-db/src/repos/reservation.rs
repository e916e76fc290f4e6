//! Reservation queue repository.
//!
//! A holding's queue is its waiting reservations ordered by `reserved_at`
//! ascending with `id` as tie-breaker. The head of that order is the next
//! reservation promoted when the holding comes back.

use libsql::Connection;

use shelf_core::entities::{Reservation, ReservationView};
use shelf_core::enums::ReservationStatus;

use crate::error::{CirculationError, DatabaseError};
use crate::helpers::parse_enum;
use crate::repos::{holding, member};
use crate::service::CirculationService;

const SELECT_COLS: &str = "id, holding_id, member_id, reserved_at, expiry_date, status";

const QUEUE_ORDER: &str = "ORDER BY reserved_at ASC, id ASC";

fn row_to_reservation(row: &libsql::Row) -> Result<Reservation, DatabaseError> {
    Ok(Reservation {
        id: row.get(0)?,
        holding_id: row.get(1)?,
        member_id: row.get(2)?,
        reserved_at: row.get(3)?,
        expiry_date: row.get::<Option<i64>>(4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
    })
}

async fn collect(mut rows: libsql::Rows) -> Result<Vec<Reservation>, DatabaseError> {
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_reservation(&row)?);
    }
    Ok(out)
}

pub(crate) async fn insert(
    conn: &Connection,
    holding_id: i64,
    member_id: i64,
    reserved_at: i64,
    expiry_date: Option<i64>,
) -> Result<Reservation, DatabaseError> {
    let status = ReservationStatus::Waiting;
    conn.execute(
        "INSERT INTO reservations (holding_id, member_id, reserved_at, expiry_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        libsql::params![holding_id, member_id, reserved_at, expiry_date, status.as_str()],
    )
    .await?;
    Ok(Reservation {
        id: conn.last_insert_rowid(),
        holding_id,
        member_id,
        reserved_at,
        expiry_date,
        status,
    })
}

/// Head of the holding's waiting queue.
pub(crate) async fn oldest_waiting(
    conn: &Connection,
    holding_id: i64,
) -> Result<Option<Reservation>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM reservations
                 WHERE holding_id = ?1 AND status = ?2 {QUEUE_ORDER} LIMIT 1"
            ),
            libsql::params![holding_id, ReservationStatus::Waiting.as_str()],
        )
        .await?;
    rows.next().await?.map(|row| row_to_reservation(&row)).transpose()
}

/// The member's waiting or available reservation for the holding, if any.
pub(crate) async fn active_for_member(
    conn: &Connection,
    holding_id: i64,
    member_id: i64,
) -> Result<Option<Reservation>, DatabaseError> {
    let [waiting, available] = ReservationStatus::ACTIVE;
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM reservations
                 WHERE holding_id = ?1 AND member_id = ?2 AND status IN (?3, ?4)
                 {QUEUE_ORDER} LIMIT 1"
            ),
            libsql::params![holding_id, member_id, waiting.as_str(), available.as_str()],
        )
        .await?;
    rows.next().await?.map(|row| row_to_reservation(&row)).transpose()
}

/// Move a reservation along its lifecycle.
///
/// The transition is checked against [`ReservationStatus::allowed_next_states`];
/// a terminal reservation is never reopened.
pub(crate) async fn advance(
    conn: &Connection,
    reservation: &Reservation,
    next: ReservationStatus,
) -> Result<Reservation, DatabaseError> {
    if !reservation.status.can_transition_to(next) {
        return Err(DatabaseError::InvalidState(format!(
            "reservation {} cannot move from {} to {next}",
            reservation.id, reservation.status
        )));
    }
    conn.execute(
        "UPDATE reservations SET status = ?1 WHERE id = ?2",
        libsql::params![next.as_str(), reservation.id],
    )
    .await?;
    Ok(Reservation {
        status: next,
        ..reservation.clone()
    })
}

pub(crate) async fn for_holding(
    conn: &Connection,
    holding_id: i64,
) -> Result<Vec<Reservation>, DatabaseError> {
    let rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM reservations WHERE holding_id = ?1 {QUEUE_ORDER}"),
            [holding_id],
        )
        .await?;
    collect(rows).await
}

pub(crate) async fn count_active_for_member(
    conn: &Connection,
    member_id: i64,
) -> Result<u64, DatabaseError> {
    let [waiting, available] = ReservationStatus::ACTIVE;
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM reservations WHERE member_id = ?1 AND status IN (?2, ?3)",
            libsql::params![member_id, waiting.as_str(), available.as_str()],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    u64::try_from(row.get::<i64>(0)?).map_err(|e| DatabaseError::Other(e.into()))
}

pub(crate) async fn recent(
    conn: &Connection,
    limit: u32,
) -> Result<Vec<ReservationView>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT r.id, r.holding_id, r.member_id, r.reserved_at, r.expiry_date, r.status,
                    h.identifier, h.title, m.identifier, m.full_name
             FROM reservations r
             JOIN holdings h ON h.id = r.holding_id
             JOIN members m ON m.id = r.member_id
             ORDER BY r.reserved_at DESC, r.id DESC
             LIMIT ?1",
            [limit],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(ReservationView {
            reservation: row_to_reservation(&row)?,
            holding_identifier: row.get(6)?,
            holding_title: row.get(7)?,
            member_identifier: row.get(8)?,
            member_name: row.get(9)?,
        });
    }
    Ok(out)
}

impl CirculationService {
    /// The reservation next in line for a holding.
    ///
    /// # Errors
    ///
    /// `Manifestation not found` for an unknown identifier.
    pub async fn oldest_waiting_reservation(
        &self,
        holding_identifier: &str,
    ) -> Result<Option<Reservation>, CirculationError> {
        let conn = self.db().session().await?;
        let holding = holding::require(&conn, holding_identifier).await?;
        Ok(oldest_waiting(&conn, holding.id).await?)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown member or holding.
    pub async fn active_reservation(
        &self,
        member_identifier: &str,
        holding_identifier: &str,
    ) -> Result<Option<Reservation>, CirculationError> {
        let conn = self.db().session().await?;
        let member = member::require(&conn, member_identifier).await?;
        let holding = holding::require(&conn, holding_identifier).await?;
        Ok(active_for_member(&conn, holding.id, member.id).await?)
    }

    /// Every reservation ever made on a holding, in queue order.
    ///
    /// # Errors
    ///
    /// `Manifestation not found` for an unknown identifier.
    pub async fn reservations_for_holding(
        &self,
        holding_identifier: &str,
    ) -> Result<Vec<Reservation>, CirculationError> {
        let conn = self.db().session().await?;
        let holding = holding::require(&conn, holding_identifier).await?;
        Ok(for_holding(&conn, holding.id).await?)
    }

    /// # Errors
    ///
    /// `Member not found` for an unknown identifier.
    pub async fn count_active_reservations_for_member(
        &self,
        member_identifier: &str,
    ) -> Result<u64, CirculationError> {
        let conn = self.db().session().await?;
        let member = member::require(&conn, member_identifier).await?;
        Ok(count_active_for_member(&conn, member.id).await?)
    }

    /// Most recent reservations across all holdings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CirculationError::Database` if the query fails.
    pub async fn recent_reservations(
        &self,
        limit: u32,
    ) -> Result<Vec<ReservationView>, CirculationError> {
        let conn = self.db().session().await?;
        Ok(recent(&conn, limit).await?)
    }
}
