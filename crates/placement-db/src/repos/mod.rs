//! Row-level persistence for approval records and their append-only ledgers.
//!
//! Functions take a `&libsql::Connection` so they run unchanged on the
//! primary connection or inside a write transaction (which derefs to one).

pub mod approval;
pub mod transition;
pub mod vote;

use crate::error::DatabaseError;

/// Convert a 1-based ledger position read from SQL.
pub(crate) fn seq_from_sql(raw: i64) -> Result<u32, DatabaseError> {
    u32::try_from(raw).map_err(|_| DatabaseError::InvalidState(format!("invalid seq {raw}")))
}
