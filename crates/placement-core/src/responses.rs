//! Read views returned by the query operations.
//!
//! These are the typed shapes handed to the excluded transport layer and
//! printed as JSON by `plc status` / `plc voting` / `plc statuses`.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::consensus::{Tally, decided_outcome, quorum};
use crate::entities::{ApprovalRecord, Transition, Vote};
use crate::enums::{ApprovalStatus, ConsensusOutcome};

/// Response from `get_approval_status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ApprovalView {
    pub approval_id: String,
    pub enrollment_id: String,
    pub current_status: ApprovalStatus,
    pub status_text: String,
    pub status_updated_at: DateTime<Utc>,
    pub committee_votes: Vec<Vote>,
    pub approval_percentage: u32,
    pub status_history: Vec<Transition>,
    pub advisor_id: Option<String>,
    pub advisor_approved_at: Option<DateTime<Utc>>,
    pub remarks: String,
    pub needs_attention: bool,
}

impl ApprovalView {
    /// Build the view from a record snapshot and its child collections.
    #[must_use]
    pub fn assemble(
        record: ApprovalRecord,
        votes: Vec<Vote>,
        history: Vec<Transition>,
        now: DateTime<Utc>,
        attention_threshold: Duration,
    ) -> Self {
        let tally = Tally::from_decisions(votes.iter().map(|v| v.decision));
        let needs_attention = record.needs_attention(now, attention_threshold);
        Self {
            approval_id: record.id,
            enrollment_id: record.enrollment_id,
            current_status: record.status,
            status_text: record.status.display_text().to_string(),
            status_updated_at: record.updated_at,
            committee_votes: votes,
            approval_percentage: tally.approval_percentage(),
            status_history: history,
            advisor_id: record.advisor_id,
            advisor_approved_at: record.advisor_approved_at,
            remarks: record.remarks,
            needs_attention,
        }
    }
}

/// Response from `get_committee_voting_data`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommitteeVotingData {
    pub enrollment_id: String,
    pub total_committee_members: u32,
    pub quorum: u32,
    pub votes: Vec<Vote>,
    pub approval_percentage: u32,
    pub voting_complete: bool,
    pub final_decision: Option<ConsensusOutcome>,
}

impl CommitteeVotingData {
    /// Summarize a record's ballots. `votes` must be in cast order.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn summarize(enrollment_id: String, committee_size: usize, votes: Vec<Vote>) -> Self {
        let tally = Tally::from_decisions(votes.iter().map(|v| v.decision));
        let final_decision = decided_outcome(committee_size, votes.iter().map(|v| v.decision));
        Self {
            enrollment_id,
            total_committee_members: committee_size as u32,
            quorum: quorum(committee_size) as u32,
            approval_percentage: tally.approval_percentage(),
            voting_complete: final_decision.is_some(),
            final_decision,
            votes,
        }
    }
}

/// One entry of the status catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusCatalogEntry {
    pub value: ApprovalStatus,
    pub label: String,
    pub terminal: bool,
    pub next: Vec<ApprovalStatus>,
}

/// Every status with its label and outgoing edges, in pipeline order.
#[must_use]
pub fn status_catalog() -> Vec<StatusCatalogEntry> {
    ApprovalStatus::ALL
        .into_iter()
        .map(|status| StatusCatalogEntry {
            value: status,
            label: status.display_text().to_string(),
            terminal: status.is_terminal(),
            next: status.allowed_next_states().to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::VoteDecision;
    use pretty_assertions::assert_eq;

    fn vote(seq: u32, voter: &str, decision: VoteDecision) -> Vote {
        Vote {
            id: format!("vot-0000000{seq}"),
            approval_id: "apr-00000001".into(),
            voter_id: voter.into(),
            decision,
            remarks: String::new(),
            seq,
            voted_at: Utc::now(),
        }
    }

    #[test]
    fn voting_data_before_quorum() {
        let data = CommitteeVotingData::summarize(
            "enr-1".into(),
            5,
            vec![vote(1, "a", VoteDecision::Approve)],
        );
        assert!(!data.voting_complete);
        assert_eq!(data.final_decision, None);
        assert_eq!(data.quorum, 3);
        assert_eq!(data.approval_percentage, 100);
    }

    #[test]
    fn voting_data_reports_decision_fixed_at_quorum() {
        let data = CommitteeVotingData::summarize(
            "enr-1".into(),
            4,
            vec![
                vote(1, "a", VoteDecision::Approve),
                vote(2, "b", VoteDecision::Reject),
                vote(3, "c", VoteDecision::Reject),
                vote(4, "d", VoteDecision::Approve),
            ],
        );
        assert!(data.voting_complete);
        assert_eq!(data.final_decision, Some(ConsensusOutcome::Rejected));
        assert_eq!(data.approval_percentage, 50);
        assert_eq!(data.total_committee_members, 4);
    }

    #[test]
    fn view_labels_status_and_computes_percentage() {
        let now = Utc::now();
        let record = ApprovalRecord {
            id: "apr-00000001".into(),
            enrollment_id: "enr-1".into(),
            status: ApprovalStatus::AdvisorApproved,
            advisor_id: Some("ins-1".into()),
            advisor_approved_at: Some(now),
            remarks: "looks good".into(),
            version: 3,
            created_at: now,
            updated_at: now,
        };
        let view = ApprovalView::assemble(
            record,
            vec![
                vote(1, "a", VoteDecision::Approve),
                vote(2, "b", VoteDecision::Reject),
            ],
            Vec::new(),
            now,
            Duration::days(7),
        );
        assert_eq!(view.status_text, "Approved by advisor");
        assert_eq!(view.approval_percentage, 50);
        assert!(!view.needs_attention);
    }

    #[test]
    fn catalog_covers_every_status() {
        let catalog = status_catalog();
        assert_eq!(catalog.len(), ApprovalStatus::ALL.len());
        let approve = catalog
            .iter()
            .find(|entry| entry.value == ApprovalStatus::Approved)
            .unwrap();
        assert!(approve.terminal);
        assert!(approve.next.is_empty());
    }
}
