//! Transaction scope for circulation operations.

use libsql::{Connection, Transaction, TransactionBehavior};
use tracing::warn;

use crate::error::{CirculationError, DatabaseError};

/// Open a write transaction, taking the database write lock up front.
pub(crate) async fn begin(conn: &Connection) -> Result<Transaction, DatabaseError> {
    Ok(conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .await?)
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged; the original error is what the caller sees.
pub(crate) async fn finish<T>(
    tx: Transaction,
    outcome: Result<T, CirculationError>,
) -> Result<T, CirculationError> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(DatabaseError::from)?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(%rollback, %error, "rollback failed after circulation error");
            }
            Err(error)
        }
    }
}
