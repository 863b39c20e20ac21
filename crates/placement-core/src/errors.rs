//! Workflow error taxonomy.
//!
//! Every engine operation returns `WorkflowError`. Storage-specific failures
//! (`DatabaseError` in placement-db) are classified into these variants at the
//! service boundary, so callers only ever match on this enum.

use thiserror::Error;

use crate::enums::{ActorRole, ApprovalStatus};

/// Errors surfaced to callers of the approval workflow engine.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No approval record exists for the enrollment.
    #[error("Approval record not found for enrollment {enrollment_id}")]
    NotFound { enrollment_id: String },

    /// The enrollment already has an approval record.
    #[error("Approval record already exists for enrollment {enrollment_id}")]
    AlreadyExists { enrollment_id: String },

    /// The requested status is not reachable from the current status.
    #[error("Invalid state transition for enrollment {enrollment_id} from {from} to {to}")]
    InvalidTransition {
        enrollment_id: String,
        from: ApprovalStatus,
        to: ApprovalStatus,
    },

    /// The caller does not hold the role the operation requires.
    #[error("{actor_id} is not the {role} for enrollment {enrollment_id}")]
    NotAuthorized {
        enrollment_id: String,
        actor_id: String,
        role: ActorRole,
    },

    /// The voter already has a ballot on this record.
    #[error("{voter_id} has already voted on enrollment {enrollment_id}")]
    AlreadyVoted {
        enrollment_id: String,
        voter_id: String,
    },

    /// Committee voting is not open in the record's current status.
    #[error("Committee voting is closed for enrollment {enrollment_id} (status {status})")]
    VotingClosed {
        enrollment_id: String,
        status: ApprovalStatus,
    },

    /// A concurrent write won; the whole operation may be retried.
    #[error("Concurrent update conflict on enrollment {enrollment_id} after {attempts} attempt(s)")]
    Conflict {
        enrollment_id: String,
        attempts: u32,
    },

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The committee directory could not answer a lookup.
    #[error("Directory lookup failed: {0}")]
    Directory(String),

    /// Unexpected persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Whether the caller may retry the whole operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = WorkflowError::InvalidTransition {
            enrollment_id: "enr-1".into(),
            from: ApprovalStatus::AdvisorApproved,
            to: ApprovalStatus::Approved,
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition for enrollment enr-1 from t.approved to approve"
        );

        let err = WorkflowError::NotAuthorized {
            enrollment_id: "enr-1".into(),
            actor_id: "ins-9".into(),
            role: ActorRole::CommitteeMember,
        };
        assert_eq!(
            err.to_string(),
            "ins-9 is not the committee_member for enrollment enr-1"
        );
    }

    #[test]
    fn only_conflict_is_retryable() {
        assert!(
            WorkflowError::Conflict {
                enrollment_id: "enr-1".into(),
                attempts: 4,
            }
            .is_retryable()
        );
        assert!(!WorkflowError::Validation("bad".into()).is_retryable());
        assert!(
            !WorkflowError::AlreadyVoted {
                enrollment_id: "enr-1".into(),
                voter_id: "ins-1".into(),
            }
            .is_retryable()
        );
    }
}
