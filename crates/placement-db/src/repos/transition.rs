//! Status transition log.

use chrono::{DateTime, Utc};

use placement_core::entities::Transition;
use placement_core::enums::{ApprovalStatus, TransitionOrigin};
use placement_core::ids::PREFIX_TRANSITION;

use super::seq_from_sql;
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{format_datetime, parse_datetime, parse_enum};

const SELECT_COLS: &str =
    "id, approval_id, seq, from_status, to_status, changed_by, origin, reason, changed_at";

fn row_to_transition(row: &libsql::Row) -> Result<Transition, DatabaseError> {
    Ok(Transition {
        id: row.get(0)?,
        approval_id: row.get(1)?,
        seq: seq_from_sql(row.get(2)?)?,
        from_status: parse_enum(&row.get::<String>(3)?)?,
        to_status: parse_enum(&row.get::<String>(4)?)?,
        changed_by: row.get(5)?,
        origin: parse_enum(&row.get::<String>(6)?)?,
        reason: row.get(7)?,
        changed_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

/// What a new log entry records; `seq` and `id` are assigned on append.
#[derive(Debug, Clone)]
pub struct NewTransition<'a> {
    pub approval_id: &'a str,
    pub from_status: ApprovalStatus,
    pub to_status: ApprovalStatus,
    pub changed_by: &'a str,
    pub origin: TransitionOrigin,
    pub reason: &'a str,
    pub changed_at: DateTime<Utc>,
}

/// Full history of a record, oldest first.
pub async fn list_for_approval(
    conn: &libsql::Connection,
    approval_id: &str,
) -> Result<Vec<Transition>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM status_transitions WHERE approval_id = ?1 ORDER BY seq"
            ),
            [approval_id],
        )
        .await?;

    let mut history = Vec::new();
    while let Some(row) = rows.next().await? {
        history.push(row_to_transition(&row)?);
    }
    Ok(history)
}

pub async fn latest(
    conn: &libsql::Connection,
    approval_id: &str,
) -> Result<Option<Transition>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM status_transitions WHERE approval_id = ?1
                 ORDER BY seq DESC LIMIT 1"
            ),
            [approval_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_transition(&row)?)),
        None => Ok(None),
    }
}

pub async fn append(
    conn: &libsql::Connection,
    entry: &NewTransition<'_>,
) -> Result<Transition, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM status_transitions WHERE approval_id = ?1",
            [entry.approval_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let seq = seq_from_sql(row.get(0)?)?;

    let id = generate_id(conn, PREFIX_TRANSITION).await?;
    conn.execute(
        &format!(
            "INSERT INTO status_transitions ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        libsql::params![
            id.as_str(),
            entry.approval_id,
            i64::from(seq),
            entry.from_status.as_str(),
            entry.to_status.as_str(),
            entry.changed_by,
            entry.origin.as_str(),
            entry.reason,
            format_datetime(&entry.changed_at)
        ],
    )
    .await?;

    Ok(Transition {
        id,
        approval_id: entry.approval_id.to_string(),
        seq,
        from_status: entry.from_status,
        to_status: entry.to_status,
        changed_by: entry.changed_by.to_string(),
        origin: entry.origin,
        reason: entry.reason.to_string(),
        changed_at: entry.changed_at,
    })
}
