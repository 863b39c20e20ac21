use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ApprovalStatus, TransitionOrigin};

/// An append-only audit record of a single status change.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub approval_id: String,
    /// 1-based position in the record's transition log.
    pub seq: u32,
    pub from_status: ApprovalStatus,
    pub to_status: ApprovalStatus,
    pub changed_by: String,
    pub origin: TransitionOrigin,
    pub reason: String,
    pub changed_at: DateTime<Utc>,
}
