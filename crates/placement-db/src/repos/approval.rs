//! Approval record repository.

use placement_core::entities::ApprovalRecord;
use placement_core::enums::ApprovalStatus;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_datetime,
};

const SELECT_COLS: &str = "id, enrollment_id, status, advisor_id, advisor_approved_at, remarks, \
                           version, created_at, updated_at";

fn row_to_approval(row: &libsql::Row) -> Result<ApprovalRecord, DatabaseError> {
    Ok(ApprovalRecord {
        id: row.get(0)?,
        enrollment_id: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        advisor_id: get_opt_string(row, 3)?,
        advisor_approved_at: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        remarks: row.get(5)?,
        version: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

pub async fn find_by_enrollment(
    conn: &libsql::Connection,
    enrollment_id: &str,
) -> Result<Option<ApprovalRecord>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM approvals WHERE enrollment_id = ?1"),
            [enrollment_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_approval(&row)?)),
        None => Ok(None),
    }
}

pub async fn insert(conn: &libsql::Connection, record: &ApprovalRecord) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO approvals ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        libsql::params![
            record.id.as_str(),
            record.enrollment_id.as_str(),
            record.status.as_str(),
            record.advisor_id.as_deref(),
            record.advisor_approved_at.as_ref().map(format_datetime),
            record.remarks.as_str(),
            record.version,
            format_datetime(&record.created_at),
            format_datetime(&record.updated_at)
        ],
    )
    .await?;
    Ok(())
}

/// Write the mutable columns of `record`, but only if the stored row still
/// carries `expected_version`.
///
/// # Errors
///
/// Returns `DatabaseError::StaleVersion` when another writer got there first.
pub async fn update_guarded(
    conn: &libsql::Connection,
    record: &ApprovalRecord,
    expected_version: i64,
) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE approvals
             SET status = ?1, advisor_approved_at = ?2, remarks = ?3, version = ?4, updated_at = ?5
             WHERE id = ?6 AND version = ?7",
            libsql::params![
                record.status.as_str(),
                record.advisor_approved_at.as_ref().map(format_datetime),
                record.remarks.as_str(),
                record.version,
                format_datetime(&record.updated_at),
                record.id.as_str(),
                expected_version
            ],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::StaleVersion {
            approval_id: record.id.clone(),
            expected: expected_version,
        });
    }
    Ok(())
}

/// Records in creation order, optionally restricted to one status.
pub async fn list(
    conn: &libsql::Connection,
    status: Option<ApprovalStatus>,
    limit: u32,
    offset: u32,
) -> Result<Vec<ApprovalRecord>, DatabaseError> {
    let mut rows = match status {
        Some(status) => {
            conn.query(
                &format!(
                    "SELECT {SELECT_COLS} FROM approvals WHERE status = ?1
                     ORDER BY created_at, rowid LIMIT ?2 OFFSET ?3"
                ),
                libsql::params![status.as_str(), limit, offset],
            )
            .await?
        }
        None => {
            conn.query(
                &format!(
                    "SELECT {SELECT_COLS} FROM approvals ORDER BY created_at, rowid LIMIT ?1 OFFSET ?2"
                ),
                libsql::params![limit, offset],
            )
            .await?
        }
    };

    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        records.push(row_to_approval(&row)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{sample_record, test_db};

    #[tokio::test]
    async fn insert_and_find_roundtrip() {
        let db = test_db().await;
        let record = sample_record("apr-00000001", "enr-1");
        insert(db.conn(), &record).await.unwrap();

        let fetched = find_by_enrollment(db.conn(), "enr-1").await.unwrap().unwrap();
        assert_eq!(fetched, record);
        assert!(find_by_enrollment(db.conn(), "enr-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_unique_violation() {
        let db = test_db().await;
        insert(db.conn(), &sample_record("apr-00000001", "enr-1"))
            .await
            .unwrap();
        let err = insert(db.conn(), &sample_record("apr-00000002", "enr-1"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn update_guarded_detects_stale_version() {
        let db = test_db().await;
        let record = sample_record("apr-00000001", "enr-1");
        insert(db.conn(), &record).await.unwrap();

        let next = ApprovalRecord {
            status: ApprovalStatus::AdvisorApproved,
            version: 1,
            ..record.clone()
        };
        update_guarded(db.conn(), &next, 0).await.unwrap();

        let err = update_guarded(db.conn(), &next, 0).await.unwrap_err();
        assert!(matches!(err, DatabaseError::StaleVersion { expected: 0, .. }));
        assert!(err.is_contention());

        let stored = find_by_enrollment(db.conn(), "enr-1").await.unwrap().unwrap();
        assert_eq!(stored.status, ApprovalStatus::AdvisorApproved);
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let db = test_db().await;
        for i in 1..=5 {
            let mut record = sample_record(&format!("apr-0000000{i}"), &format!("enr-{i}"));
            if i % 2 == 0 {
                record.status = ApprovalStatus::Denied;
            }
            insert(db.conn(), &record).await.unwrap();
        }

        assert_eq!(list(db.conn(), None, 10, 0).await.unwrap().len(), 5);
        assert_eq!(list(db.conn(), None, 2, 4).await.unwrap().len(), 1);

        let denied = list(db.conn(), Some(ApprovalStatus::Denied), 10, 0)
            .await
            .unwrap();
        assert_eq!(denied.len(), 2);
        assert!(denied.iter().all(|r| r.status == ApprovalStatus::Denied));
    }
}
