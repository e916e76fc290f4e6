//! Catalog repository: holdings and their workflow place.

use chrono::{DateTime, Utc};
use libsql::Connection;

use shelf_core::entities::Holding;
use shelf_core::errors::CoreError;

use crate::error::{CirculationError, DatabaseError};
use crate::helpers::{format_datetime, parse_datetime};
use crate::service::CirculationService;

const SELECT_COLS: &str = "id, identifier, title, place, created_at, updated_at";

fn row_to_holding(row: &libsql::Row) -> Result<Holding, DatabaseError> {
    Ok(Holding {
        id: row.get(0)?,
        identifier: row.get(1)?,
        title: row.get(2)?,
        place: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

pub(crate) async fn by_identifier(
    conn: &Connection,
    identifier: &str,
) -> Result<Option<Holding>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM holdings WHERE identifier = ?1"),
            [identifier],
        )
        .await?;
    rows.next().await?.map(|row| row_to_holding(&row)).transpose()
}

/// Resolve an identifier or fail with `Manifestation not found`.
pub(crate) async fn require(conn: &Connection, identifier: &str) -> Result<Holding, CirculationError> {
    Ok(by_identifier(conn, identifier)
        .await?
        .ok_or_else(|| CoreError::holding_not_found(identifier))?)
}

pub(crate) async fn update_place(
    conn: &Connection,
    id: i64,
    place: &str,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE holdings SET place = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![place, format_datetime(now), id],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::NoResult);
    }
    Ok(())
}

impl CirculationService {
    /// Add a holding to the catalog.
    ///
    /// `place` is normalized against the workflow's declared places; when
    /// absent the holding starts in the workflow's initial place.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank identifier or an unknown place, `Conflict` if
    /// the identifier is already registered.
    pub async fn register_holding(
        &self,
        identifier: &str,
        title: &str,
        place: Option<&str>,
    ) -> Result<Holding, CirculationError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CoreError::Validation("Holding identifier is required".into()).into());
        }
        let workflow = self.workflow()?;
        let place = match place {
            Some(raw) => workflow.assert_valid_place(raw)?,
            None => workflow.initial_place().to_string(),
        };

        let now = self.now();
        let conn = self.db().session().await?;
        if by_identifier(&conn, identifier).await?.is_some() {
            return Err(CoreError::Conflict(format!(
                "Manifestation already registered: {identifier}"
            ))
            .into());
        }
        conn.execute(
            "INSERT INTO holdings (identifier, title, place, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![identifier, title, place.as_str(), format_datetime(now), format_datetime(now)],
        )
        .await?;

        let holding = Holding {
            id: conn.last_insert_rowid(),
            identifier: identifier.to_string(),
            title: title.to_string(),
            place,
            created_at: now,
            updated_at: now,
        };
        tracing::info!(holding = %holding.identifier, place = %holding.place, "holding registered");
        Ok(holding)
    }

    /// # Errors
    ///
    /// Returns `CirculationError::Database` if the query fails.
    pub async fn find_holding_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Holding>, CirculationError> {
        let conn = self.db().session().await?;
        Ok(by_identifier(&conn, identifier).await?)
    }

    /// # Errors
    ///
    /// Returns `Manifestation not found` if no holding has this identifier.
    pub async fn get_holding(&self, identifier: &str) -> Result<Holding, CirculationError> {
        let conn = self.db().session().await?;
        require(&conn, identifier).await
    }
}
