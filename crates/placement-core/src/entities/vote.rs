use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::VoteDecision;

/// One committee member's ballot on an approval record. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Vote {
    pub id: String,
    pub approval_id: String,
    pub voter_id: String,
    pub decision: VoteDecision,
    pub remarks: String,
    /// 1-based cast order within the record.
    pub seq: u32,
    pub voted_at: DateTime<Utc>,
}
