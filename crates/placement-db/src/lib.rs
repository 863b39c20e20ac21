//! # placement-db
//!
//! libSQL storage and the approval workflow engine for internship placements.
//!
//! Holds the relational state (approval records, committee ballots, status
//! transitions) and the `ApprovalService` that drives records through the
//! advisor, committee, and document stages. Every mutation runs in its own
//! `BEGIN IMMEDIATE` transaction on a dedicated connection, guarded by the
//! record's version column.

pub mod directory;
pub mod error;
pub mod events;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod workflow;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use tracing::debug;

const MEMORY_PATH: &str = ":memory:";

/// Central database handle for approval state.
///
/// Wraps a libSQL database plus a primary connection used for migrations and
/// reads. Operations get their own connection from [`ApprovalDb::connect`].
///
/// # Limits
///
/// - `SQLite` has one write lock per database file. `BEGIN IMMEDIATE` on two
///   different records still serializes: the second writer waits up to the
///   busy timeout and is then retried as a conflict. Record-level isolation
///   comes from the version guard, not from the lock.
/// - `":memory:"` databases have a single connection shared by every
///   operation. Writes there are fully serialized, and reads issued while a
///   write transaction is open report `Conflict` instead of observing
///   uncommitted rows. Use an on-disk path for concurrent workloads.
pub struct ApprovalDb {
    db: libsql::Database,
    conn: libsql::Connection,
    in_memory: bool,
    busy_timeout: Duration,
}

impl ApprovalDb {
    /// Open a local database at the given path with the default busy timeout.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with(path, Duration::from_secs(5)).await
    }

    /// Open a local database with an explicit busy timeout.
    ///
    /// `":memory:"` databases exist per connection in `SQLite`, so writers
    /// share the primary connection there; on-disk databases switch to WAL so
    /// readers never wait on a writer.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local_with(
        path: &str,
        busy_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
            && path != MEMORY_PATH
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Migration(format!("create {}: {e}", parent.display()))
            })?;
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let in_memory = path == MEMORY_PATH;

        if !in_memory {
            let mut rows = conn
                .query("PRAGMA journal_mode = WAL", ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
            while rows.next().await?.is_some() {}
        }

        let approval_db = Self {
            db,
            conn,
            in_memory,
            busy_timeout,
        };
        approval_db.configure(&approval_db.conn).await?;
        approval_db.run_migrations().await?;
        debug!(path, in_memory, "approval database opened");
        Ok(approval_db)
    }

    /// Access the primary libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Whether the database lives only in memory.
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Connection for one operation (a transaction or a consistent read).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be opened or configured.
    pub async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        if self.in_memory {
            return Ok(self.conn.clone());
        }
        let conn = self.db.connect()?;
        self.configure(&conn).await?;
        Ok(conn)
    }

    /// Apply the per-connection pragmas: foreign keys and the busy timeout.
    async fn configure(&self, conn: &libsql::Connection) -> Result<(), DatabaseError> {
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let mut rows = conn
            .query(
                &format!("PRAGMA busy_timeout = {}", self.busy_timeout.as_millis()),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        while rows.next().await?.is_some() {}
        Ok(())
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"apr-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on a specific connection (usable inside a transaction).
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
