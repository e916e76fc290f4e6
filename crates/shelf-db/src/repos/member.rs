//! Member repository.

use chrono::NaiveDate;
use libsql::Connection;

use shelf_core::entities::Member;
use shelf_core::errors::CoreError;

use crate::error::{CirculationError, DatabaseError};
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, parse_optional_date};
use crate::service::CirculationService;

const SELECT_COLS: &str = "id, identifier, full_name, expiry_date, created_at, updated_at";

fn row_to_member(row: &libsql::Row) -> Result<Member, DatabaseError> {
    Ok(Member {
        id: row.get(0)?,
        identifier: row.get(1)?,
        full_name: row.get(2)?,
        expiry_date: parse_optional_date(get_opt_string(row, 3)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

pub(crate) async fn by_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<Member>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM members WHERE identifier = ?1"),
            [identifier],
        )
        .await?;
    rows.next().await?.map(|row| row_to_member(&row)).transpose()
}

pub(crate) async fn by_id(conn: &Connection, id: i64) -> Result<Option<Member>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM members WHERE id = ?1"), [id])
        .await?;
    rows.next().await?.map(|row| row_to_member(&row)).transpose()
}

/// Resolve an identifier or fail with `Member not found`.
pub(crate) async fn require(conn: &Connection, identifier: &str) -> Result<Member, CirculationError> {
    Ok(by_identifier(conn, identifier)
        .await?
        .ok_or_else(|| CoreError::member_not_found(identifier))?)
}

impl CirculationService {
    /// Add a member.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank identifier or name, `Conflict` if the
    /// identifier is already registered.
    pub async fn register_member(
        &self,
        identifier: &str,
        full_name: &str,
        expiry_date: Option<NaiveDate>,
    ) -> Result<Member, CirculationError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || full_name.trim().is_empty() {
            return Err(
                CoreError::Validation("Member identifier and name are required".into()).into(),
            );
        }

        let now = self.now();
        let conn = self.db().session().await?;
        if by_identifier(&conn, identifier).await?.is_some() {
            return Err(
                CoreError::Conflict(format!("Member already registered: {identifier}")).into(),
            );
        }
        conn.execute(
            "INSERT INTO members (identifier, full_name, expiry_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                identifier,
                full_name,
                expiry_date.map(|d| d.format("%Y-%m-%d").to_string()),
                format_datetime(now),
                format_datetime(now)
            ],
        )
        .await?;

        let member = Member {
            id: conn.last_insert_rowid(),
            identifier: identifier.to_string(),
            full_name: full_name.to_string(),
            expiry_date,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(member = %member.identifier, "member registered");
        Ok(member)
    }

    /// # Errors
    ///
    /// Returns `CirculationError::Database` if the query fails.
    pub async fn find_member_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Member>, CirculationError> {
        let conn = self.db().session().await?;
        Ok(by_identifier(&conn, identifier).await?)
    }

    /// Look a member up by row id, e.g. the borrower of a loan.
    ///
    /// # Errors
    ///
    /// Returns `CirculationError::Database` if the query fails.
    pub async fn find_member_by_id(&self, id: i64) -> Result<Option<Member>, CirculationError> {
        let conn = self.db().session().await?;
        Ok(by_id(&conn, id).await?)
    }

    /// # Errors
    ///
    /// Returns `Member not found` if no member has this identifier.
    pub async fn get_member(&self, identifier: &str) -> Result<Member, CirculationError> {
        let conn = self.db().session().await?;
        require(&conn, identifier).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn register_and_find_member() {
        let svc = test_service().await;
        let expiry = NaiveDate::from_ymd_opt(2027, 3, 31);
        let member = svc.register_member("M1", "Ada Lovelace", expiry).await.unwrap();
        assert_eq!(member.expiry_date, expiry);

        let found = svc.find_member_by_identifier("M1").await.unwrap().unwrap();
        assert_eq!(found, member);
        assert_eq!(svc.find_member_by_id(member.id).await.unwrap(), Some(member));
        assert!(svc.find_member_by_identifier("M2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let svc = test_service().await;
        assert!(svc.register_member("M1", "  ", None).await.is_err());
    }

    #[tokio::test]
    async fn unknown_member_message() {
        let svc = test_service().await;
        let err = svc.get_member("M9").await.unwrap_err();
        assert_eq!(err.to_string(), "Member not found: M9");
    }
}
