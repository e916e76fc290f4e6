//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. Every statement is idempotent, so re-running is harmless.
//! Vocabulary normalization runs before the uniqueness guards are created so
//! that legacy rows are compared in canonical form.

use crate::ShelfDb;
use crate::error::DatabaseError;

/// Catalog, members, reservations, loans, and their lookup indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_circulation.sql");
const MIGRATION_002: &str = include_str!("../migrations/002_status_vocabulary.sql");
const MIGRATION_003: &str = include_str!("../migrations/003_circulation_guards.sql");

const MIGRATIONS: [(&str, &str); 3] = [
    ("001_circulation", MIGRATION_001),
    ("002_status_vocabulary", MIGRATION_002),
    ("003_circulation_guards", MIGRATION_003),
];

impl ShelfDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        for (name, sql) in MIGRATIONS {
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::debug!(migration = name, "migration applied");
        }
        Ok(())
    }
}
