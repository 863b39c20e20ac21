//! Shared test utilities for placement-db unit tests.

pub(crate) mod helpers {
    use chrono::Utc;
    use placement_core::entities::ApprovalRecord;
    use placement_core::enums::ApprovalStatus;

    use crate::ApprovalDb;
    use crate::directory::StaticDirectory;
    use crate::service::ApprovalService;

    pub const SECTION: &str = "sec-a";
    pub const ADVISOR: &str = "ins-advisor";

    /// In-memory database with the schema applied.
    pub async fn test_db() -> ApprovalDb {
        ApprovalDb::open_local(":memory:").await.unwrap()
    }

    /// A fresh `registered` record with the standard advisor.
    pub fn sample_record(id: &str, enrollment_id: &str) -> ApprovalRecord {
        let now = Utc::now();
        ApprovalRecord {
            id: id.to_string(),
            enrollment_id: enrollment_id.to_string(),
            status: ApprovalStatus::Registered,
            advisor_id: Some(ADVISOR.to_string()),
            advisor_approved_at: None,
            remarks: String::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Committee member ids `ins-1` .. `ins-{size}`.
    pub fn committee(size: usize) -> Vec<String> {
        (1..=size).map(|i| format!("ins-{i}")).collect()
    }

    /// Directory placing `enrollments` in one section with a committee of `size`.
    pub fn directory(enrollments: &[&str], size: usize) -> StaticDirectory {
        enrollments
            .iter()
            .fold(StaticDirectory::new(), |dir, enrollment| {
                dir.with_enrollment(enrollment, SECTION, Some(ADVISOR))
            })
            .with_committee(SECTION, committee(size))
    }

    /// In-memory service over [`directory`].
    pub async fn test_service(enrollments: &[&str], size: usize) -> ApprovalService<StaticDirectory> {
        ApprovalService::new(test_db().await, directory(enrollments, size))
    }
}
