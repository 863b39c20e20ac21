//! Service layer orchestrating approval mutations.
//!
//! `ApprovalService` owns the database handle, the committee directory, the
//! retry policy, and the event bus. Workflow operations are implemented as
//! `impl ApprovalService` blocks under [`crate::workflow`].
//!
//! Every mutation follows this protocol:
//! 1. Open a dedicated connection and `BEGIN IMMEDIATE`
//! 2. Re-read the record and validate against the state machine
//! 3. Write the record (version-guarded) and append to the ledgers
//! 4. Commit, or roll back on any error
//! 5. Publish `StatusChanged` events for committed transitions
//!
//! Conflicts (busy database, stale version) replay the whole operation with
//! exponential backoff until the retry budget runs out.

use std::future::Future;

use placement_config::PlacementConfig;
use placement_core::entities::{DEFAULT_ATTENTION_DAYS, Transition};
use placement_core::errors::WorkflowError;
use placement_core::events::StatusChanged;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::ApprovalDb;
use crate::directory::{CommitteeDirectory, DirectoryError};
use crate::error::DatabaseError;
use crate::events::EventBus;
use crate::retry::RetryConfig;

pub struct ApprovalService<D> {
    db: ApprovalDb,
    directory: D,
    retry: RetryConfig,
    attention_threshold: chrono::Duration,
    events: EventBus,
}

impl<D: CommitteeDirectory> ApprovalService<D> {
    /// Wrap an open database with default retry and attention settings.
    #[must_use]
    pub fn new(db: ApprovalDb, directory: D) -> Self {
        Self {
            db,
            directory,
            retry: RetryConfig::default(),
            attention_threshold: chrono::Duration::days(DEFAULT_ATTENTION_DAYS),
            events: EventBus::new(),
        }
    }

    /// Open the configured database and apply the engine settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn from_config(
        config: &PlacementConfig,
        directory: D,
    ) -> Result<Self, DatabaseError> {
        let db =
            ApprovalDb::open_local_with(&config.database.path, config.database.busy_timeout())
                .await?;
        Ok(Self::new(db, directory)
            .with_retry(RetryConfig::from(&config.engine))
            .with_attention_threshold(chrono::Duration::days(i64::from(
                config.engine.attention_days,
            ))))
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn with_attention_threshold(mut self, threshold: chrono::Duration) -> Self {
        self.attention_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn db(&self) -> &ApprovalDb {
        &self.db
    }

    #[must_use]
    pub const fn directory(&self) -> &D {
        &self.directory
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    #[must_use]
    pub const fn attention_threshold(&self) -> chrono::Duration {
        self.attention_threshold
    }

    /// Receive every status change committed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChanged> {
        self.events.subscribe()
    }

    /// Publish committed transitions.
    pub(crate) fn publish(&self, enrollment_id: &str, transitions: &[Transition]) {
        for transition in transitions {
            let receivers = self
                .events
                .emit(StatusChanged::from_transition(enrollment_id, transition));
            debug!(enrollment_id, to = %transition.to_status, receivers, "status change published");
        }
    }

    /// Run `attempt` until it succeeds, fails with a non-conflict error, or
    /// the retry budget is exhausted.
    pub(crate) async fn retry_on_conflict<T, F, Fut>(
        &self,
        enrollment_id: &str,
        mut attempt: F,
    ) -> Result<T, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        let mut made = 1;
        loop {
            match attempt().await {
                Err(WorkflowError::Conflict { .. }) if made < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(made);
                    warn!(enrollment_id, attempt = made, ?delay, "write conflict, retrying");
                    tokio::time::sleep(delay).await;
                    made += 1;
                }
                Err(WorkflowError::Conflict { .. }) => {
                    warn!(enrollment_id, attempts = made, "write conflict, giving up");
                    return Err(WorkflowError::Conflict {
                        enrollment_id: enrollment_id.to_string(),
                        attempts: made,
                    });
                }
                other => return other,
            }
        }
    }

    /// A fresh connection for one operation.
    pub(crate) async fn connection(
        &self,
        enrollment_id: &str,
    ) -> Result<libsql::Connection, WorkflowError> {
        self.db
            .connect()
            .await
            .map_err(|e| storage_error(enrollment_id, e))
    }
}

/// Start a `BEGIN IMMEDIATE` transaction on an operation's connection.
pub(crate) async fn begin_write(
    conn: &libsql::Connection,
    enrollment_id: &str,
) -> Result<libsql::Transaction, WorkflowError> {
    conn.transaction_with_behavior(libsql::TransactionBehavior::Immediate)
        .await
        .map_err(|e| storage_error(enrollment_id, e.into()))
}

/// Commit on success, roll back on failure.
pub(crate) async fn finish<T>(
    tx: libsql::Transaction,
    enrollment_id: &str,
    result: Result<T, WorkflowError>,
) -> Result<T, WorkflowError> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| storage_error(enrollment_id, e.into()))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(enrollment_id, error = %rollback, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Classify a storage failure at the engine boundary.
pub(crate) fn storage_error(enrollment_id: &str, err: DatabaseError) -> WorkflowError {
    if err.is_contention() {
        WorkflowError::Conflict {
            enrollment_id: enrollment_id.to_string(),
            attempts: 1,
        }
    } else {
        WorkflowError::Storage(err.to_string())
    }
}

pub(crate) fn directory_error(err: DirectoryError) -> WorkflowError {
    WorkflowError::Directory(err.to_string())
}

/// Reject blank identifiers before touching storage.
pub(crate) fn require(field: &str, value: &str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        return Err(WorkflowError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
