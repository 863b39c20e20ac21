//! Database error types for placement-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
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

    /// The guarded row changed since it was read.
    #[error("Stale version for approval {approval_id}: expected {expected}")]
    StaleVersion { approval_id: String, expected: i64 },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

impl DatabaseError {
    /// Whether another writer held the lock or won the version race.
    #[must_use]
    pub fn is_contention(&self) -> bool {
        match self {
            Self::StaleVersion { .. } => true,
            Self::LibSql(e) => crate::retry::is_contention_error(e),
            _ => false,
        }
    }

    /// Whether a UNIQUE constraint rejected the write.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::LibSql(e) => crate::retry::is_unique_violation(e),
            _ => false,
        }
    }
}
