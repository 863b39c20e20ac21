//! The advisor's approve/deny decision.

use chrono::Utc;
use tracing::info;

use placement_core::entities::{ApprovalRecord, Transition};
use placement_core::enums::{ActorRole, ApprovalStatus, TransitionOrigin};
use placement_core::errors::WorkflowError;

use super::{StatusChange, apply_status_change, load_record};
use crate::directory::CommitteeDirectory;
use crate::service::{ApprovalService, begin_write, finish, require};

impl<D: CommitteeDirectory> ApprovalService<D> {
    /// Record the assigned advisor's decision on a `registered` or `pending` record.
    ///
    /// Approval moves the record to `t.approved` and stamps
    /// `advisor_approved_at`; rejection moves it to `denied`. The remarks are
    /// stored on the record and as the transition reason.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidTransition` when the record is past the advisor
    /// stage, `NotAuthorized` when `advisor_id` is not the record's advisor.
    pub async fn advisor_decision(
        &self,
        enrollment_id: &str,
        advisor_id: &str,
        approved: bool,
        remarks: &str,
    ) -> Result<ApprovalRecord, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        require("advisor_id", advisor_id)?;

        let (record, transition) = self
            .retry_on_conflict(enrollment_id, move || {
                self.advisor_decision_once(enrollment_id, advisor_id, approved, remarks)
            })
            .await?;

        info!(
            enrollment_id,
            advisor_id,
            from = %transition.from_status,
            to = %transition.to_status,
            "advisor decision applied"
        );
        self.publish(enrollment_id, std::slice::from_ref(&transition));
        Ok(record)
    }

    async fn advisor_decision_once(
        &self,
        enrollment_id: &str,
        advisor_id: &str,
        approved: bool,
        remarks: &str,
    ) -> Result<(ApprovalRecord, Transition), WorkflowError> {
        let target = if approved {
            ApprovalStatus::AdvisorApproved
        } else {
            ApprovalStatus::Denied
        };

        let conn = self.connection(enrollment_id).await?;
        let tx = begin_write(&conn, enrollment_id).await?;

        let result: Result<(ApprovalRecord, Transition), WorkflowError> = async {
            let record = load_record(&tx, enrollment_id).await?;
            if !record.status.accepts_advisor_decision() {
                return Err(WorkflowError::InvalidTransition {
                    enrollment_id: enrollment_id.to_string(),
                    from: record.status,
                    to: target,
                });
            }
            if !record.is_assigned_advisor(advisor_id) {
                return Err(WorkflowError::NotAuthorized {
                    enrollment_id: enrollment_id.to_string(),
                    actor_id: advisor_id.to_string(),
                    role: ActorRole::Advisor,
                });
            }

            apply_status_change(
                &tx,
                &record,
                &StatusChange {
                    to: target,
                    changed_by: advisor_id,
                    origin: TransitionOrigin::Advisor,
                    reason: remarks,
                    remarks: Some(remarks),
                    at: Utc::now(),
                },
            )
            .await
        }
        .await;

        finish(tx, enrollment_id, result).await
    }
}
