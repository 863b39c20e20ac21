//! Status-changed event published after a transition commits.
//!
//! Consumed by the notification subsystem, which lives outside this workspace.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Transition;
use crate::enums::{ApprovalStatus, TransitionOrigin};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChanged {
    pub approval_id: String,
    pub enrollment_id: String,
    pub from: ApprovalStatus,
    pub to: ApprovalStatus,
    pub changed_by: String,
    pub origin: TransitionOrigin,
    pub reason: String,
    pub changed_at: DateTime<Utc>,
}

impl StatusChanged {
    #[must_use]
    pub fn from_transition(enrollment_id: &str, transition: &Transition) -> Self {
        Self {
            approval_id: transition.approval_id.clone(),
            enrollment_id: enrollment_id.to_string(),
            from: transition.from_status,
            to: transition.to_status,
            changed_by: transition.changed_by.clone(),
            origin: transition.origin,
            reason: transition.reason.clone(),
            changed_at: transition.changed_at,
        }
    }
}
