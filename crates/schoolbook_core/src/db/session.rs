//! Scoped unit-of-work helpers.
//!
//! # Responsibility
//! - Run a closure inside one transaction: commit on success, roll back
//!   and propagate on any failure. No partial commits.
//! - Hand out caller-managed transactions for per-request consumption.
//!
//! # Invariants
//! - One unit-of-work per logical operation; transactions are never
//!   shared across concurrent operations.
//! - A caller-managed session dropped without `commit()` rolls back.

use super::{DbError, DbResult};
use log::error;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `op` inside one immediate transaction.
///
/// Commits all pending changes when `op` returns `Ok`; on `Err`, rolls
/// back everything written in the scope, logs the failure and re-raises
/// it unchanged.
pub fn session_scope<T, E>(
    conn: &mut Connection,
    op: impl FnOnce(&Transaction<'_>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<DbError> + std::fmt::Display,
{
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(DbError::from)?;

    match op(&tx) {
        Ok(value) => {
            tx.commit().map_err(DbError::from)?;
            Ok(value)
        }
        Err(err) => {
            error!(
                "event=session_scope module=db status=error error_code=scope_failed error={}",
                err
            );
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=session_scope module=db status=error error_code=rollback_failed error={}",
                    rollback_err
                );
            }
            Err(err)
        }
    }
}

/// Opens a caller-managed session (one per inbound request).
///
/// There is no auto-commit: the caller must call `commit()` explicitly;
/// dropping the transaction rolls back, and the underlying connection is
/// released either way.
pub fn open_session(conn: &mut Connection) -> DbResult<Transaction<'_>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    Ok(tx)
}
