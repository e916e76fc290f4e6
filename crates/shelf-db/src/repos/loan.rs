//! Loan ledger repository.
//!
//! Loans are appended on checkout and closed in place on check-in; rows are
//! never deleted. "Latest" means greatest `checked_out_at`, ties broken by the
//! greater `id`.

use chrono::{DateTime, Utc};
use libsql::Connection;

use shelf_core::entities::{Loan, LoanView};
use shelf_core::enums::LoanStatus;

use crate::error::{CirculationError, DatabaseError};
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::repos::holding;
use crate::service::CirculationService;

const SELECT_COLS: &str = "id, holding_id, member_id, checked_out_at, due_date, checked_in_at, status, created_at, updated_at";

const LATEST_FIRST: &str = "ORDER BY checked_out_at DESC, id DESC";

fn row_to_loan(row: &libsql::Row) -> Result<Loan, DatabaseError> {
    Ok(Loan {
        id: row.get(0)?,
        holding_id: row.get(1)?,
        member_id: row.get(2)?,
        checked_out_at: parse_datetime(&row.get::<String>(3)?)?,
        due_date: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        checked_in_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        status: parse_enum(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

async fn collect(mut rows: libsql::Rows) -> Result<Vec<Loan>, DatabaseError> {
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_loan(&row)?);
    }
    Ok(out)
}

pub(crate) async fn insert(
    conn: &Connection,
    holding_id: i64,
    member_id: i64,
    checked_out_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
) -> Result<Loan, DatabaseError> {
    let status = LoanStatus::CheckedOut;
    conn.execute(
        &format!(
            "INSERT INTO loans ({SELECT_COLS})
             VALUES (NULL, ?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7)"
        ),
        libsql::params![
            holding_id,
            member_id,
            format_datetime(checked_out_at),
            due_date.map(format_datetime),
            status.as_str(),
            format_datetime(checked_out_at),
            format_datetime(checked_out_at)
        ],
    )
    .await?;
    Ok(Loan {
        id: conn.last_insert_rowid(),
        holding_id,
        member_id,
        checked_out_at,
        due_date,
        checked_in_at: None,
        status,
        created_at: checked_out_at,
        updated_at: checked_out_at,
    })
}

async fn first(
    conn: &Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Option<Loan>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    rows.next().await?.map(|row| row_to_loan(&row)).transpose()
}

/// The holding's open loan, if it is out.
pub(crate) async fn open_for_holding(
    conn: &Connection,
    holding_id: i64,
) -> Result<Option<Loan>, DatabaseError> {
    first(
        conn,
        &format!(
            "SELECT {SELECT_COLS} FROM loans WHERE holding_id = ?1 AND status = ?2 {LATEST_FIRST} LIMIT 1"
        ),
        libsql::params![holding_id, LoanStatus::CheckedOut.as_str()],
    )
    .await
}

/// The holding's most recent loan in any status.
pub(crate) async fn latest_for_holding(
    conn: &Connection,
    holding_id: i64,
) -> Result<Option<Loan>, DatabaseError> {
    first(
        conn,
        &format!("SELECT {SELECT_COLS} FROM loans WHERE holding_id = ?1 {LATEST_FIRST} LIMIT 1"),
        [holding_id],
    )
    .await
}

/// Close an open loan.
pub(crate) async fn mark_returned(
    conn: &Connection,
    loan: &Loan,
    at: DateTime<Utc>,
) -> Result<Loan, DatabaseError> {
    if !loan.is_open() {
        return Err(DatabaseError::InvalidState(format!(
            "loan {} is already {}",
            loan.id, loan.status
        )));
    }
    let status = LoanStatus::Returned;
    conn.execute(
        "UPDATE loans SET status = ?1, checked_in_at = ?2, updated_at = ?3 WHERE id = ?4",
        libsql::params![status.as_str(), format_datetime(at), format_datetime(at), loan.id],
    )
    .await?;
    Ok(Loan {
        status,
        checked_in_at: Some(at),
        updated_at: at,
        ..loan.clone()
    })
}

pub(crate) async fn for_holding(conn: &Connection, holding_id: i64) -> Result<Vec<Loan>, DatabaseError> {
    let rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM loans WHERE holding_id = ?1 {LATEST_FIRST}"),
            [holding_id],
        )
        .await?;
    collect(rows).await
}

async fn views(
    conn: &Connection,
    status: LoanStatus,
    order_by: &str,
    limit: u32,
) -> Result<Vec<LoanView>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT l.id, l.holding_id, l.member_id, l.checked_out_at, l.due_date,
                        l.checked_in_at, l.status, l.created_at, l.updated_at,
                        h.identifier, h.title, m.identifier, m.full_name
                 FROM loans l
                 JOIN holdings h ON h.id = l.holding_id
                 JOIN members m ON m.id = l.member_id
                 WHERE l.status = ?1
                 ORDER BY {order_by}
                 LIMIT ?2"
            ),
            libsql::params![status.as_str(), limit],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(LoanView {
            loan: row_to_loan(&row)?,
            holding_identifier: row.get(9)?,
            holding_title: row.get(10)?,
            member_identifier: row.get(11)?,
            member_name: row.get(12)?,
        });
    }
    Ok(out)
}

impl CirculationService {
    /// # Errors
    ///
    /// `Manifestation not found` for an unknown identifier.
    pub async fn open_loan_for_holding(
        &self,
        holding_identifier: &str,
    ) -> Result<Option<Loan>, CirculationError> {
        let conn = self.db().session().await?;
        let holding = holding::require(&conn, holding_identifier).await?;
        Ok(open_for_holding(&conn, holding.id).await?)
    }

    /// # Errors
    ///
    /// `Manifestation not found` for an unknown identifier.
    pub async fn latest_loan_for_holding(
        &self,
        holding_identifier: &str,
    ) -> Result<Option<Loan>, CirculationError> {
        let conn = self.db().session().await?;
        let holding = holding::require(&conn, holding_identifier).await?;
        Ok(latest_for_holding(&conn, holding.id).await?)
    }

    /// Full loan history of a holding, newest first.
    ///
    /// # Errors
    ///
    /// `Manifestation not found` for an unknown identifier.
    pub async fn loans_for_holding(
        &self,
        holding_identifier: &str,
    ) -> Result<Vec<Loan>, CirculationError> {
        let conn = self.db().session().await?;
        let holding = holding::require(&conn, holding_identifier).await?;
        Ok(for_holding(&conn, holding.id).await?)
    }

    /// Loans currently out, most recently checked out first.
    ///
    /// # Errors
    ///
    /// Returns `CirculationError::Database` if the query fails.
    pub async fn open_loans(&self, limit: u32) -> Result<Vec<LoanView>, CirculationError> {
        let conn = self.db().session().await?;
        Ok(views(&conn, LoanStatus::CheckedOut, "l.checked_out_at DESC, l.id DESC", limit).await?)
    }

    /// Closed loans, most recently returned first.
    ///
    /// # Errors
    ///
    /// Returns `CirculationError::Database` if the query fails.
    pub async fn returned_loans(&self, limit: u32) -> Result<Vec<LoanView>, CirculationError> {
        let conn = self.db().session().await?;
        Ok(views(&conn, LoanStatus::Returned, "l.checked_in_at DESC, l.id DESC", limit).await?)
    }
}
