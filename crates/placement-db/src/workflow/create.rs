//! Approval record creation.

use chrono::Utc;
use tracing::{debug, info};

use placement_core::entities::ApprovalRecord;
use placement_core::enums::ApprovalStatus;
use placement_core::errors::WorkflowError;
use placement_core::ids::PREFIX_APPROVAL;

use crate::directory::CommitteeDirectory;
use crate::generate_id;
use crate::repos::approval;
use crate::service::{ApprovalService, begin_write, directory_error, finish, require, storage_error};

impl<D: CommitteeDirectory> ApprovalService<D> {
    /// Register the approval record for an enrollment.
    ///
    /// Without an explicit `advisor_id`, the directory's assigned advisor is
    /// used (the record may still end up without one).
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if the enrollment has a record, `Validation` for blank
    /// ids, `Directory` when the advisor lookup fails.
    pub async fn create_approval_record(
        &self,
        enrollment_id: &str,
        advisor_id: Option<&str>,
    ) -> Result<ApprovalRecord, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        let advisor_id = match advisor_id {
            Some(id) => {
                require("advisor_id", id)?;
                Some(id.to_string())
            }
            None => {
                let assigned = self
                    .directory()
                    .assigned_advisor(enrollment_id)
                    .await
                    .map_err(directory_error)?;
                debug!(enrollment_id, advisor = ?assigned, "advisor resolved from directory");
                assigned
            }
        };

        let advisor = advisor_id.as_deref();
        let record = self
            .retry_on_conflict(enrollment_id, move || self.create_once(enrollment_id, advisor))
            .await?;
        info!(enrollment_id, approval_id = %record.id, "approval record created");
        Ok(record)
    }

    async fn create_once(
        &self,
        enrollment_id: &str,
        advisor_id: Option<&str>,
    ) -> Result<ApprovalRecord, WorkflowError> {
        let conn = self.connection(enrollment_id).await?;
        let tx = begin_write(&conn, enrollment_id).await?;

        let result: Result<ApprovalRecord, WorkflowError> = async {
            let existing = approval::find_by_enrollment(&tx, enrollment_id)
                .await
                .map_err(|e| storage_error(enrollment_id, e))?;
            if existing.is_some() {
                return Err(already_exists(enrollment_id));
            }

            let now = Utc::now();
            let record = ApprovalRecord {
                id: generate_id(&tx, PREFIX_APPROVAL)
                    .await
                    .map_err(|e| storage_error(enrollment_id, e))?,
                enrollment_id: enrollment_id.to_string(),
                status: ApprovalStatus::Registered,
                advisor_id: advisor_id.map(String::from),
                advisor_approved_at: None,
                remarks: String::new(),
                version: 0,
                created_at: now,
                updated_at: now,
            };
            approval::insert(&tx, &record).await.map_err(|e| {
                if e.is_unique_violation() {
                    already_exists(enrollment_id)
                } else {
                    storage_error(enrollment_id, e)
                }
            })?;
            Ok(record)
        }
        .await;

        finish(tx, enrollment_id, result).await
    }
}

fn already_exists(enrollment_id: &str) -> WorkflowError {
    WorkflowError::AlreadyExists {
        enrollment_id: enrollment_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{ADVISOR, test_service};
    use placement_core::ids::has_prefix;

    #[tokio::test]
    async fn creates_registered_record() {
        let svc = test_service(&["enr-1"], 3).await;
        let record = svc
            .create_approval_record("enr-1", Some("ins-explicit"))
            .await
            .unwrap();
        assert!(has_prefix(&record.id, PREFIX_APPROVAL));
        assert_eq!(record.status, ApprovalStatus::Registered);
        assert_eq!(record.advisor_id.as_deref(), Some("ins-explicit"));
        assert_eq!(record.version, 0);
        assert!(svc.get_transition_history("enr-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn advisor_falls_back_to_directory() {
        let svc = test_service(&["enr-1"], 3).await;
        let record = svc.create_approval_record("enr-1", None).await.unwrap();
        assert_eq!(record.advisor_id.as_deref(), Some(ADVISOR));

        let unknown = svc.create_approval_record("enr-unlisted", None).await.unwrap();
        assert_eq!(unknown.advisor_id, None);
    }

    #[tokio::test]
    async fn duplicate_enrollment_rejected() {
        let svc = test_service(&["enr-1"], 3).await;
        svc.create_approval_record("enr-1", None).await.unwrap();
        let err = svc.create_approval_record("enr-1", None).await.unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn blank_enrollment_rejected() {
        let svc = test_service(&[], 3).await;
        let err = svc.create_approval_record(" ", None).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
