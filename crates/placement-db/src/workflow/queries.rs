//! Read-side queries. None of these take a write lock or mutate state.

use chrono::Utc;
use tracing::debug;

use placement_core::consensus::Tally;
use placement_core::entities::{ApprovalRecord, Transition, Vote};
use placement_core::enums::ApprovalStatus;
use placement_core::errors::WorkflowError;
use placement_core::responses::{ApprovalView, CommitteeVotingData};

use super::load_record;
use crate::directory::CommitteeDirectory;
use crate::repos::{approval, transition, vote};
use crate::service::{ApprovalService, directory_error, require, storage_error};

type Snapshot = (ApprovalRecord, Vec<Vote>, Vec<Transition>);

async fn load_snapshot(
    conn: &libsql::Connection,
    enrollment_id: &str,
) -> Result<Snapshot, WorkflowError> {
    let record = load_record(conn, enrollment_id).await?;
    let votes = vote::list_for_approval(conn, &record.id)
        .await
        .map_err(|e| storage_error(enrollment_id, e))?;
    let history = transition::list_for_approval(conn, &record.id)
        .await
        .map_err(|e| storage_error(enrollment_id, e))?;
    Ok((record, votes, history))
}

impl<D: CommitteeDirectory> ApprovalService<D> {
    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn get_record(&self, enrollment_id: &str) -> Result<ApprovalRecord, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        self.retry_on_conflict(enrollment_id, move || self.record_once(enrollment_id))
            .await
    }

    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn get_status(&self, enrollment_id: &str) -> Result<ApprovalStatus, WorkflowError> {
        Ok(self.get_record(enrollment_id).await?.status)
    }

    /// Ballots in cast order.
    ///
    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn get_votes(&self, enrollment_id: &str) -> Result<Vec<Vote>, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        self.retry_on_conflict(enrollment_id, move || self.votes_once(enrollment_id))
            .await
    }

    /// Status changes, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn get_transition_history(
        &self,
        enrollment_id: &str,
    ) -> Result<Vec<Transition>, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        self.retry_on_conflict(enrollment_id, move || self.history_once(enrollment_id))
            .await
    }

    /// Share of approving ballots, `0..=100`, truncated.
    ///
    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn compute_approval_percentage(&self, enrollment_id: &str) -> Result<u32, WorkflowError> {
        let votes = self.get_votes(enrollment_id).await?;
        Ok(Tally::from_decisions(votes.iter().map(|v| v.decision)).approval_percentage())
    }

    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn has_voted(&self, enrollment_id: &str, voter_id: &str) -> Result<bool, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        self.retry_on_conflict(enrollment_id, move || {
            self.has_voted_once(enrollment_id, voter_id)
        })
        .await
    }

    /// Record, ballots, and history read as one consistent snapshot.
    ///
    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record.
    pub async fn get_approval_status(&self, enrollment_id: &str) -> Result<ApprovalView, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        let (record, votes, history) = self
            .retry_on_conflict(enrollment_id, move || self.read_snapshot(enrollment_id))
            .await?;
        Ok(ApprovalView::assemble(
            record,
            votes,
            history,
            Utc::now(),
            self.attention_threshold(),
        ))
    }

    /// Committee size, ballots, and the decision fixed at quorum.
    ///
    /// # Errors
    ///
    /// `NotFound` when the enrollment has no record, `Directory` when the
    /// committee lookup fails.
    pub async fn get_committee_voting_data(
        &self,
        enrollment_id: &str,
    ) -> Result<CommitteeVotingData, WorkflowError> {
        let votes = self.get_votes(enrollment_id).await?;
        let members = self.committee_for(enrollment_id).await?;
        Ok(CommitteeVotingData::summarize(
            enrollment_id.to_string(),
            members.len(),
            votes,
        ))
    }

    /// Records in creation order, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero limit, `Storage` when the query fails.
    pub async fn list_by_status(
        &self,
        status: Option<ApprovalStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ApprovalRecord>, WorkflowError> {
        if limit == 0 {
            return Err(WorkflowError::Validation("limit must be at least 1".into()));
        }
        self.retry_on_conflict("*", move || self.list_once(status, limit, offset))
            .await
    }

    /// Committee members for the enrollment's course section.
    pub(crate) async fn committee_for(&self, enrollment_id: &str) -> Result<Vec<String>, WorkflowError> {
        let Some(section) = self
            .directory()
            .section_for_enrollment(enrollment_id)
            .await
            .map_err(directory_error)?
        else {
            debug!(enrollment_id, "enrollment has no course section");
            return Ok(Vec::new());
        };
        let members = self
            .directory()
            .committee_members(&section)
            .await
            .map_err(directory_error)?;
        debug!(enrollment_id, section, size = members.len(), "committee resolved");
        Ok(members)
    }

    /// The shared connection for reads that need no snapshot.
    ///
    /// An in-memory database has a single connection, so while another
    /// operation holds its write transaction a read there would observe
    /// uncommitted rows. Such reads report `Conflict` and are replayed.
    fn read_conn(&self, enrollment_id: &str) -> Result<&libsql::Connection, WorkflowError> {
        let conn = self.db().conn();
        if self.db().is_in_memory() && !conn.is_autocommit() {
            debug!(enrollment_id, "read deferred behind open write transaction");
            return Err(WorkflowError::Conflict {
                enrollment_id: enrollment_id.to_string(),
                attempts: 1,
            });
        }
        Ok(conn)
    }

    async fn record_once(&self, enrollment_id: &str) -> Result<ApprovalRecord, WorkflowError> {
        load_record(self.read_conn(enrollment_id)?, enrollment_id).await
    }

    async fn votes_once(&self, enrollment_id: &str) -> Result<Vec<Vote>, WorkflowError> {
        let conn = self.read_conn(enrollment_id)?;
        let record = load_record(conn, enrollment_id).await?;
        vote::list_for_approval(conn, &record.id)
            .await
            .map_err(|e| storage_error(enrollment_id, e))
    }

    async fn history_once(&self, enrollment_id: &str) -> Result<Vec<Transition>, WorkflowError> {
        let conn = self.read_conn(enrollment_id)?;
        let record = load_record(conn, enrollment_id).await?;
        transition::list_for_approval(conn, &record.id)
            .await
            .map_err(|e| storage_error(enrollment_id, e))
    }

    async fn has_voted_once(
        &self,
        enrollment_id: &str,
        voter_id: &str,
    ) -> Result<bool, WorkflowError> {
        let conn = self.read_conn(enrollment_id)?;
        let record = load_record(conn, enrollment_id).await?;
        vote::has_voted(conn, &record.id, voter_id)
            .await
            .map_err(|e| storage_error(enrollment_id, e))
    }

    async fn list_once(
        &self,
        status: Option<ApprovalStatus>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ApprovalRecord>, WorkflowError> {
        let conn = self.read_conn("*")?;
        approval::list(conn, status, limit, offset)
            .await
            .map_err(|e| WorkflowError::Storage(e.to_string()))
    }

    async fn read_snapshot(&self, enrollment_id: &str) -> Result<Snapshot, WorkflowError> {
        if self.db().is_in_memory() {
            return load_snapshot(self.read_conn(enrollment_id)?, enrollment_id).await;
        }

        let conn = self.connection(enrollment_id).await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| storage_error(enrollment_id, e.into()))?;
        let result = load_snapshot(&tx, enrollment_id).await;
        if let Err(e) = tx.rollback().await {
            debug!(enrollment_id, error = %e, "read snapshot rollback failed");
        }
        result
    }
}
