//! Committee vote ledger.

use chrono::{DateTime, Utc};

use placement_core::entities::Vote;
use placement_core::enums::VoteDecision;
use placement_core::ids::PREFIX_VOTE;

use super::seq_from_sql;
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{format_datetime, parse_datetime, parse_enum};

const SELECT_COLS: &str = "id, approval_id, voter_id, decision, remarks, seq, voted_at";

fn row_to_vote(row: &libsql::Row) -> Result<Vote, DatabaseError> {
    Ok(Vote {
        id: row.get(0)?,
        approval_id: row.get(1)?,
        voter_id: row.get(2)?,
        decision: parse_enum(&row.get::<String>(3)?)?,
        remarks: row.get(4)?,
        seq: seq_from_sql(row.get(5)?)?,
        voted_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Votes on a record in cast order.
pub async fn list_for_approval(
    conn: &libsql::Connection,
    approval_id: &str,
) -> Result<Vec<Vote>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM committee_votes WHERE approval_id = ?1 ORDER BY seq"),
            [approval_id],
        )
        .await?;

    let mut votes = Vec::new();
    while let Some(row) = rows.next().await? {
        votes.push(row_to_vote(&row)?);
    }
    Ok(votes)
}

pub async fn has_voted(
    conn: &libsql::Connection,
    approval_id: &str,
    voter_id: &str,
) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM committee_votes WHERE approval_id = ?1 AND voter_id = ?2",
            [approval_id, voter_id],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Append a ballot at the next `seq`.
///
/// A second ballot from the same voter fails with a UNIQUE violation.
pub async fn append(
    conn: &libsql::Connection,
    approval_id: &str,
    voter_id: &str,
    decision: VoteDecision,
    remarks: &str,
    voted_at: DateTime<Utc>,
) -> Result<Vote, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM committee_votes WHERE approval_id = ?1",
            [approval_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let seq = seq_from_sql(row.get(0)?)?;

    let id = generate_id(conn, PREFIX_VOTE).await?;
    conn.execute(
        &format!("INSERT INTO committee_votes ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        libsql::params![
            id.as_str(),
            approval_id,
            voter_id,
            decision.as_str(),
            remarks,
            i64::from(seq),
            format_datetime(&voted_at)
        ],
    )
    .await?;

    Ok(Vote {
        id,
        approval_id: approval_id.to_string(),
        voter_id: voter_id.to_string(),
        decision,
        remarks: remarks.to_string(),
        seq,
        voted_at,
    })
}
