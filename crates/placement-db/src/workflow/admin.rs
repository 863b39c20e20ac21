//! Administrator overrides.

use chrono::Utc;
use tracing::info;

use placement_core::entities::{ApprovalRecord, Transition};
use placement_core::enums::{ApprovalStatus, TransitionOrigin};
use placement_core::errors::WorkflowError;

use super::{StatusChange, apply_status_change, load_record};
use crate::directory::CommitteeDirectory;
use crate::service::{ApprovalService, begin_write, finish, require};

impl<D: CommitteeDirectory> ApprovalService<D> {
    /// Move a record along any edge of the state machine, bypassing the
    /// advisor and committee checks. The reason replaces the remarks.
    ///
    /// # Errors
    ///
    /// `NotFound`, or `InvalidTransition` when `new_status` is not reachable.
    pub async fn admin_override(
        &self,
        enrollment_id: &str,
        new_status: ApprovalStatus,
        changed_by: &str,
        reason: &str,
    ) -> Result<ApprovalRecord, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        require("changed_by", changed_by)?;

        let (record, transition) = self
            .retry_on_conflict(enrollment_id, move || {
                self.admin_override_once(enrollment_id, new_status, changed_by, reason)
            })
            .await?;

        info!(
            enrollment_id,
            changed_by,
            from = %transition.from_status,
            to = %transition.to_status,
            "administrator override applied"
        );
        self.publish(enrollment_id, std::slice::from_ref(&transition));
        Ok(record)
    }

    async fn admin_override_once(
        &self,
        enrollment_id: &str,
        new_status: ApprovalStatus,
        changed_by: &str,
        reason: &str,
    ) -> Result<(ApprovalRecord, Transition), WorkflowError> {
        let conn = self.connection(enrollment_id).await?;
        let tx = begin_write(&conn, enrollment_id).await?;

        let result: Result<(ApprovalRecord, Transition), WorkflowError> = async {
            let record = load_record(&tx, enrollment_id).await?;
            apply_status_change(
                &tx,
                &record,
                &StatusChange {
                    to: new_status,
                    changed_by,
                    origin: TransitionOrigin::Administrator,
                    reason,
                    remarks: Some(reason),
                    at: Utc::now(),
                },
            )
            .await
        }
        .await;

        finish(tx, enrollment_id, result).await
    }
}
