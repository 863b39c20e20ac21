//! Status enums, vote decisions, and transition origins.
//!
//! `ApprovalStatus` serializes to the dotted wire names used by the rest of the
//! placement system (`t.approved`, `doc.cancel`, ...). The remaining enums use
//! `#[serde(rename_all = "snake_case")]`. The approval state machine lives in
//! `ApprovalStatus::allowed_next_states()`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::WorkflowError;

// ---------------------------------------------------------------------------
// ApprovalStatus
// ---------------------------------------------------------------------------

/// Status of an internship placement approval.
///
/// ```text
/// registered ─┬→ t.approved → c.approved → doc.approved → approve
/// pending ────┘      │             │              └─────→ doc.cancel
///                    │             └────────────────────→ doc.cancel
///                    └→ denied → registered (restart)
/// registered / pending → denied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ApprovalStatus {
    #[serde(rename = "registered")]
    Registered,
    #[serde(rename = "pending")]
    Pending,
    /// Approved by the academic advisor.
    #[serde(rename = "t.approved")]
    AdvisorApproved,
    /// Approved by committee consensus.
    #[serde(rename = "c.approved")]
    CommitteeApproved,
    #[serde(rename = "doc.approved")]
    DocumentApproved,
    #[serde(rename = "doc.cancel")]
    DocumentCancelled,
    #[serde(rename = "approve")]
    Approved,
    #[serde(rename = "denied")]
    Denied,
}

impl ApprovalStatus {
    /// Every status, in pipeline order.
    pub const ALL: [Self; 8] = [
        Self::Registered,
        Self::Pending,
        Self::AdvisorApproved,
        Self::CommitteeApproved,
        Self::DocumentApproved,
        Self::DocumentCancelled,
        Self::Approved,
        Self::Denied,
    ];

    /// Valid next states from the current state.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Registered => &[Self::AdvisorApproved, Self::Denied],
            Self::Pending => &[Self::AdvisorApproved, Self::Denied],
            Self::AdvisorApproved => &[Self::CommitteeApproved, Self::Denied],
            Self::CommitteeApproved => &[Self::DocumentApproved, Self::DocumentCancelled],
            Self::DocumentApproved => &[Self::Approved, Self::DocumentCancelled],
            Self::DocumentCancelled | Self::Approved => &[],
            Self::Denied => &[Self::Registered],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Terminal states have no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_next_states().is_empty()
    }

    /// Whether an advisor decision may be taken from this state.
    #[must_use]
    pub const fn accepts_advisor_decision(self) -> bool {
        matches!(self, Self::Registered | Self::Pending)
    }

    /// Intermediate states that are flagged when a record sits in them too long.
    #[must_use]
    pub const fn is_attention_state(self) -> bool {
        matches!(self, Self::AdvisorApproved | Self::DocumentApproved)
    }

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Pending => "pending",
            Self::AdvisorApproved => "t.approved",
            Self::CommitteeApproved => "c.approved",
            Self::DocumentApproved => "doc.approved",
            Self::DocumentCancelled => "doc.cancel",
            Self::Approved => "approve",
            Self::Denied => "denied",
        }
    }

    /// Human-readable label shown next to the status.
    #[must_use]
    pub const fn display_text(self) -> &'static str {
        match self {
            Self::Registered => "Registered",
            Self::Pending => "Pending",
            Self::AdvisorApproved => "Approved by advisor",
            Self::CommitteeApproved => "Approved by committee",
            Self::DocumentApproved => "Documents approved",
            Self::DocumentCancelled => "Documents cancelled",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WorkflowError::Validation(format!("unknown approval status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// VoteDecision
// ---------------------------------------------------------------------------

/// A committee member's ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoteDecision {
    Approve,
    Reject,
}

impl VoteDecision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for VoteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDecision {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(WorkflowError::Validation(format!(
                "vote must be either 'approve' or 'reject', got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TransitionOrigin
// ---------------------------------------------------------------------------

/// Which workflow path produced a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOrigin {
    Advisor,
    Committee,
    Administrator,
}

impl TransitionOrigin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advisor => "advisor",
            Self::Committee => "committee",
            Self::Administrator => "administrator",
        }
    }
}

impl fmt::Display for TransitionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConsensusOutcome
// ---------------------------------------------------------------------------

/// Result of a committee round once quorum is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusOutcome {
    Approved,
    Rejected,
}

impl ConsensusOutcome {
    /// The approval status a decided round moves the record to.
    #[must_use]
    pub const fn target_status(self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::CommitteeApproved,
            Self::Rejected => ApprovalStatus::Denied,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ConsensusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActorRole
// ---------------------------------------------------------------------------

/// Role an actor claimed when an authorization check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Advisor,
    CommitteeMember,
}

impl ActorRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Advisor => "advisor",
            Self::CommitteeMember => "committee_member",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // --- Transition tests ---

    #[rstest]
    #[case(ApprovalStatus::Registered, ApprovalStatus::AdvisorApproved)]
    #[case(ApprovalStatus::Registered, ApprovalStatus::Denied)]
    #[case(ApprovalStatus::Pending, ApprovalStatus::AdvisorApproved)]
    #[case(ApprovalStatus::Pending, ApprovalStatus::Denied)]
    #[case(ApprovalStatus::AdvisorApproved, ApprovalStatus::CommitteeApproved)]
    #[case(ApprovalStatus::AdvisorApproved, ApprovalStatus::Denied)]
    #[case(ApprovalStatus::CommitteeApproved, ApprovalStatus::DocumentApproved)]
    #[case(ApprovalStatus::CommitteeApproved, ApprovalStatus::DocumentCancelled)]
    #[case(ApprovalStatus::DocumentApproved, ApprovalStatus::Approved)]
    #[case(ApprovalStatus::DocumentApproved, ApprovalStatus::DocumentCancelled)]
    #[case(ApprovalStatus::Denied, ApprovalStatus::Registered)]
    fn valid_transitions(#[case] from: ApprovalStatus, #[case] to: ApprovalStatus) {
        assert!(from.can_transition_to(to), "{from} -> {to} should be allowed");
    }

    #[test]
    fn transition_table_has_exactly_eleven_edges() {
        let edges = ApprovalStatus::ALL
            .iter()
            .flat_map(|from| ApprovalStatus::ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .count();
        assert_eq!(edges, 11);
    }

    #[rstest]
    #[case(ApprovalStatus::Registered, ApprovalStatus::CommitteeApproved)]
    #[case(ApprovalStatus::AdvisorApproved, ApprovalStatus::AdvisorApproved)]
    #[case(ApprovalStatus::CommitteeApproved, ApprovalStatus::Denied)]
    #[case(ApprovalStatus::Denied, ApprovalStatus::AdvisorApproved)]
    #[case(ApprovalStatus::Approved, ApprovalStatus::Registered)]
    #[case(ApprovalStatus::DocumentCancelled, ApprovalStatus::DocumentApproved)]
    fn invalid_transitions(#[case] from: ApprovalStatus, #[case] to: ApprovalStatus) {
        assert!(!from.can_transition_to(to), "{from} -> {to} should be rejected");
    }

    #[test]
    fn terminal_states() {
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::DocumentCancelled.is_terminal());
        assert!(!ApprovalStatus::Denied.is_terminal());
    }

    #[test]
    fn every_status_reachable_from_registered() {
        let mut reached = vec![ApprovalStatus::Registered];
        let mut frontier = vec![ApprovalStatus::Registered];
        while let Some(status) = frontier.pop() {
            for next in status.allowed_next_states() {
                if !reached.contains(next) {
                    reached.push(*next);
                    frontier.push(*next);
                }
            }
        }
        // `pending` has no inbound edge.
        for status in ApprovalStatus::ALL {
            if status != ApprovalStatus::Pending {
                assert!(reached.contains(&status), "{status} unreachable");
            }
        }
    }

    // --- Wire names ---

    #[test]
    fn status_serializes_to_dotted_wire_name() {
        let json = serde_json::to_string(&ApprovalStatus::AdvisorApproved).unwrap();
        assert_eq!(json, "\"t.approved\"");
        let recovered: ApprovalStatus = serde_json::from_str("\"doc.cancel\"").unwrap();
        assert_eq!(recovered, ApprovalStatus::DocumentCancelled);
    }

    #[test]
    fn serde_name_matches_as_str_for_all_statuses() {
        for status in ApprovalStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<ApprovalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_validation_error() {
        let err = "approved".parse::<ApprovalStatus>().unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn decision_parsing() {
        assert_eq!("approve".parse::<VoteDecision>().unwrap(), VoteDecision::Approve);
        assert_eq!("reject".parse::<VoteDecision>().unwrap(), VoteDecision::Reject);
        let err = "abstain".parse::<VoteDecision>().unwrap_err();
        assert!(err.to_string().contains("'approve' or 'reject'"));
    }

    #[test]
    fn consensus_targets() {
        assert_eq!(
            ConsensusOutcome::Approved.target_status(),
            ApprovalStatus::CommitteeApproved
        );
        assert_eq!(
            ConsensusOutcome::Rejected.target_status(),
            ApprovalStatus::Denied
        );
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", ApprovalStatus::DocumentApproved), "doc.approved");
        assert_eq!(format!("{}", VoteDecision::Reject), "reject");
        assert_eq!(format!("{}", TransitionOrigin::Administrator), "administrator");
        assert_eq!(format!("{}", ConsensusOutcome::Rejected), "rejected");
        assert_eq!(format!("{}", ActorRole::CommitteeMember), "committee_member");
    }
}
