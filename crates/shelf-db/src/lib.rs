//! # shelf-db
//!
//! libSQL persistence for Shelf: catalog holdings, members, the reservation
//! queue, and the loan ledger, plus the circulation engine that mutates them.
//!
//! Every circulation operation runs inside one `BEGIN IMMEDIATE` transaction.
//! The schema backs the engine's invariants with partial unique indexes, so
//! two writers racing on the same holding cannot both commit.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
mod txn;

#[cfg(test)]
mod test_support;

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// How long a connection waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const IN_MEMORY: &str = ":memory:";

/// Central database handle.
///
/// File-backed databases hand out a fresh connection per operation via
/// [`session`](Self::session) so concurrent operations each get their own
/// transaction. An in-memory database only exists on its primary connection,
/// so every session shares that one and sessions are taken one at a time.
pub struct ShelfDb {
    db: libsql::Database,
    conn: libsql::Connection,
    in_memory: bool,
    busy_timeout: Duration,
    shared: Arc<Mutex<()>>,
}

/// A connection lent out for one unit of work.
///
/// On an in-memory database the session holds the shared-connection lock
/// until it is dropped, so a transaction begun on it cannot interleave with
/// another caller's.
pub struct Session {
    conn: libsql::Connection,
    _turn: Option<OwnedMutexGuard<()>>,
}

impl Deref for Session {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl ShelfDb {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with_timeout(path, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Like [`open_local`](Self::open_local) with an explicit busy timeout.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened, configured,
    /// or migrated.
    pub async fn open_local_with_timeout(
        path: &str,
        busy_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        configure(&conn, busy_timeout).await?;

        let shelf_db = Self {
            db,
            conn,
            in_memory: path == IN_MEMORY,
            busy_timeout,
            shared: Arc::new(Mutex::new(())),
        };
        shelf_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(shelf_db)
    }

    /// The primary connection, used for migrations and direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// A connection for one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a new connection cannot be opened or configured.
    pub async fn session(&self) -> Result<Session, DatabaseError> {
        if self.in_memory {
            let turn = Arc::clone(&self.shared).lock_owned().await;
            return Ok(Session {
                conn: self.conn.clone(),
                _turn: Some(turn),
            });
        }
        let conn = self.db.connect()?;
        configure(&conn, self.busy_timeout).await?;
        Ok(Session { conn, _turn: None })
    }
}

/// Per-connection pragmas. `SQLite` does not persist either setting.
async fn configure(conn: &libsql::Connection, busy_timeout: Duration) -> Result<(), DatabaseError> {
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
    // busy_timeout echoes the new value as a row, so it must go through query().
    conn.query(
        &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
    Ok(())
}
