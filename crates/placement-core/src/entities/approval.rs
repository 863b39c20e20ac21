use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ApprovalStatus;

/// Days a record may sit in an attention state before it is flagged.
pub const DEFAULT_ATTENTION_DAYS: i64 = 7;

/// The approval aggregate for one student enrollment.
///
/// Votes and transitions live in their own append-only tables keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ApprovalRecord {
    pub id: String,
    pub enrollment_id: String,
    pub status: ApprovalStatus,
    pub advisor_id: Option<String>,
    pub advisor_approved_at: Option<DateTime<Utc>>,
    pub remarks: String,
    /// Bumped on every mutation; guards concurrent writers.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApprovalRecord {
    /// Whether the record has been stuck in `t.approved` or `doc.approved` for
    /// longer than `threshold` as of `now`.
    #[must_use]
    pub fn needs_attention(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.status.is_attention_state() && now - self.updated_at > threshold
    }

    /// Whether `actor_id` is the advisor assigned to this record.
    #[must_use]
    pub fn is_assigned_advisor(&self, actor_id: &str) -> bool {
        self.advisor_id.as_deref() == Some(actor_id)
    }
}
