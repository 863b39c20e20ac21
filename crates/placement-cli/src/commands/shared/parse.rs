use std::str::FromStr;

use placement_core::enums::{ApprovalStatus, VoteDecision};

/// Parse a status wire name (`t.approved`, `doc.cancel`, ...).
pub fn parse_status(raw: &str) -> anyhow::Result<ApprovalStatus> {
    ApprovalStatus::from_str(raw.trim()).map_err(anyhow::Error::from)
}

/// Parse `approve` / `reject`.
pub fn parse_decision(raw: &str) -> anyhow::Result<VoteDecision> {
    VoteDecision::from_str(raw.trim().to_ascii_lowercase().as_str()).map_err(anyhow::Error::from)
}
