//! Approval workflow operations.
//!
//! Each actor gets its own module of `impl ApprovalService` methods: record
//! creation, the advisor decision, committee voting, administrator overrides,
//! and the read-side queries. The helpers here run inside an open write
//! transaction.

mod admin;
mod advisor;
mod committee;
mod create;
mod queries;

pub use committee::COMMITTEE_DECISION_REASON;

use chrono::{DateTime, Utc};
use placement_core::entities::{ApprovalRecord, Transition};
use placement_core::enums::{ApprovalStatus, TransitionOrigin};
use placement_core::errors::WorkflowError;

use crate::repos::{approval, transition};
use crate::service::storage_error;

/// A validated status change about to be written.
pub(crate) struct StatusChange<'a> {
    pub to: ApprovalStatus,
    pub changed_by: &'a str,
    pub origin: TransitionOrigin,
    pub reason: &'a str,
    /// Replaces the record's remarks when set.
    pub remarks: Option<&'a str>,
    pub at: DateTime<Utc>,
}

pub(crate) async fn load_record(
    conn: &libsql::Connection,
    enrollment_id: &str,
) -> Result<ApprovalRecord, WorkflowError> {
    approval::find_by_enrollment(conn, enrollment_id)
        .await
        .map_err(|e| storage_error(enrollment_id, e))?
        .ok_or_else(|| WorkflowError::NotFound {
            enrollment_id: enrollment_id.to_string(),
        })
}

/// Validate against the state machine, write the record, append the log entry.
pub(crate) async fn apply_status_change(
    conn: &libsql::Connection,
    current: &ApprovalRecord,
    change: &StatusChange<'_>,
) -> Result<(ApprovalRecord, Transition), WorkflowError> {
    let enrollment_id = current.enrollment_id.as_str();
    if !current.status.can_transition_to(change.to) {
        return Err(WorkflowError::InvalidTransition {
            enrollment_id: enrollment_id.to_string(),
            from: current.status,
            to: change.to,
        });
    }

    let mut next = current.clone();
    next.status = change.to;
    next.version += 1;
    next.updated_at = change.at;
    if let Some(remarks) = change.remarks {
        next.remarks = remarks.to_string();
    }
    if change.origin == TransitionOrigin::Advisor && change.to == ApprovalStatus::AdvisorApproved {
        next.advisor_approved_at = Some(change.at);
    }

    approval::update_guarded(conn, &next, current.version)
        .await
        .map_err(|e| storage_error(enrollment_id, e))?;

    let logged = transition::append(
        conn,
        &transition::NewTransition {
            approval_id: &current.id,
            from_status: current.status,
            to_status: change.to,
            changed_by: change.changed_by,
            origin: change.origin,
            reason: change.reason,
            changed_at: change.at,
        },
    )
    .await
    .map_err(|e| storage_error(enrollment_id, e))?;

    Ok((next, logged))
}

/// Record activity on a record whose status did not change.
pub(crate) async fn touch(
    conn: &libsql::Connection,
    current: &ApprovalRecord,
    at: DateTime<Utc>,
) -> Result<ApprovalRecord, WorkflowError> {
    let next = ApprovalRecord {
        version: current.version + 1,
        updated_at: at,
        ..current.clone()
    };
    approval::update_guarded(conn, &next, current.version)
        .await
        .map_err(|e| storage_error(&current.enrollment_id, e))?;
    Ok(next)
}
