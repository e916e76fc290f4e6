//! Database error types for shelf-db.

use shelf_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned a row that could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether a write was refused by a UNIQUE constraint or index.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::LibSql(e) => e.to_string().contains("UNIQUE constraint failed"),
            _ => false,
        }
    }
}

/// Errors from the circulation engine and the repositories behind it.
///
/// Domain failures (unknown member, duplicate checkout, bad input) surface as
/// [`CoreError`]. A write refused by a uniqueness guard is also a domain
/// failure: it means a concurrent operation got there first.
#[derive(Debug, Error)]
pub enum CirculationError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for CirculationError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            Self::Core(CoreError::Conflict(format!(
                "Conflicting circulation record: {err}"
            )))
        } else {
            Self::Database(err)
        }
    }
}

impl From<libsql::Error> for CirculationError {
    fn from(err: libsql::Error) -> Self {
        DatabaseError::from(err).into()
    }
}

impl CirculationError {
    /// Whether the caller, rather than the store, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        match self {
            Self::Core(e) => e.is_client_error(),
            Self::Database(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_not_client_errors() {
        let err = CirculationError::from(DatabaseError::NoResult);
        assert!(matches!(err, CirculationError::Database(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn domain_failures_pass_through() {
        let err = CirculationError::from(CoreError::member_not_found("M9"));
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Member not found: M9");
    }

    #[test]
    fn non_libsql_errors_are_never_unique_violations() {
        let err = DatabaseError::Query("UNIQUE constraint failed: loans.holding_id".into());
        assert!(!err.is_unique_violation());
    }
}
