//! Committee ballots and the consensus decision.

use chrono::Utc;
use tracing::{debug, info};

use placement_core::consensus::{self, Tally};
use placement_core::entities::{ApprovalRecord, Transition, Vote};
use placement_core::enums::{ActorRole, ApprovalStatus, TransitionOrigin, VoteDecision};
use placement_core::errors::WorkflowError;

use super::{StatusChange, apply_status_change, load_record, touch};
use crate::directory::CommitteeDirectory;
use crate::repos::{transition, vote};
use crate::service::{ApprovalService, begin_write, finish, require, storage_error};

/// Transition reason recorded when quorum decides a round.
pub const COMMITTEE_DECISION_REASON: &str = "Committee voting completed";

/// Ballots are accepted while the round is open (`t.approved`) and, once the
/// committee itself decided, as late votes that no longer change anything.
fn voting_open(status: ApprovalStatus, latest: Option<&Transition>) -> bool {
    match status {
        ApprovalStatus::AdvisorApproved => true,
        ApprovalStatus::CommitteeApproved | ApprovalStatus::Denied => {
            latest.is_some_and(|t| t.origin == TransitionOrigin::Committee)
        }
        _ => false,
    }
}

type VoteOutcome = (ApprovalRecord, Vote, Option<Transition>);

impl<D: CommitteeDirectory> ApprovalService<D> {
    /// Cast a committee member's ballot and decide the round once quorum is reached.
    ///
    /// # Errors
    ///
    /// `NotFound`, `VotingClosed` outside the voting window, `NotAuthorized`
    /// for non-members, `AlreadyVoted` for a second ballot, `Directory` when
    /// the committee lookup fails.
    pub async fn committee_vote(
        &self,
        enrollment_id: &str,
        voter_id: &str,
        decision: VoteDecision,
        remarks: &str,
    ) -> Result<ApprovalRecord, WorkflowError> {
        require("enrollment_id", enrollment_id)?;
        require("voter_id", voter_id)?;

        self.get_record(enrollment_id).await?;
        let members = self.committee_for(enrollment_id).await?;
        let members = members.as_slice();

        let (record, ballot, decided) = self
            .retry_on_conflict(enrollment_id, move || {
                self.committee_vote_once(enrollment_id, voter_id, decision, remarks, members)
            })
            .await?;

        debug!(enrollment_id, voter_id, seq = ballot.seq, %decision, "ballot recorded");
        if let Some(transition) = decided {
            info!(
                enrollment_id,
                deciding_voter = voter_id,
                to = %transition.to_status,
                "committee decision applied"
            );
            self.publish(enrollment_id, std::slice::from_ref(&transition));
        }
        Ok(record)
    }

    async fn committee_vote_once(
        &self,
        enrollment_id: &str,
        voter_id: &str,
        decision: VoteDecision,
        remarks: &str,
        members: &[String],
    ) -> Result<VoteOutcome, WorkflowError> {
        let conn = self.connection(enrollment_id).await?;
        let tx = begin_write(&conn, enrollment_id).await?;

        let result: Result<VoteOutcome, WorkflowError> = async {
            let record = load_record(&tx, enrollment_id).await?;
            let latest = transition::latest(&tx, &record.id)
                .await
                .map_err(|e| storage_error(enrollment_id, e))?;
            if !voting_open(record.status, latest.as_ref()) {
                return Err(WorkflowError::VotingClosed {
                    enrollment_id: enrollment_id.to_string(),
                    status: record.status,
                });
            }

            if !members.iter().any(|member| member == voter_id) {
                return Err(WorkflowError::NotAuthorized {
                    enrollment_id: enrollment_id.to_string(),
                    actor_id: voter_id.to_string(),
                    role: ActorRole::CommitteeMember,
                });
            }

            let already_voted = || WorkflowError::AlreadyVoted {
                enrollment_id: enrollment_id.to_string(),
                voter_id: voter_id.to_string(),
            };
            if vote::has_voted(&tx, &record.id, voter_id)
                .await
                .map_err(|e| storage_error(enrollment_id, e))?
            {
                return Err(already_voted());
            }

            let now = Utc::now();
            let ballot = vote::append(&tx, &record.id, voter_id, decision, remarks, now)
                .await
                .map_err(|e| {
                    if e.is_unique_violation() {
                        already_voted()
                    } else {
                        storage_error(enrollment_id, e)
                    }
                })?;

            // Late ballot in a decided round: recorded, never re-evaluated.
            if record.status != ApprovalStatus::AdvisorApproved {
                let record = touch(&tx, &record, now).await?;
                return Ok((record, ballot, None));
            }

            let votes = vote::list_for_approval(&tx, &record.id)
                .await
                .map_err(|e| storage_error(enrollment_id, e))?;
            let tally = Tally::from_decisions(votes.iter().map(|v| v.decision));

            match consensus::evaluate(members.len(), &tally) {
                Some(outcome) => {
                    let (record, logged) = apply_status_change(
                        &tx,
                        &record,
                        &StatusChange {
                            to: outcome.target_status(),
                            changed_by: voter_id,
                            origin: TransitionOrigin::Committee,
                            reason: COMMITTEE_DECISION_REASON,
                            remarks: None,
                            at: now,
                        },
                    )
                    .await?;
                    Ok((record, ballot, Some(logged)))
                }
                None => {
                    let record = touch(&tx, &record, now).await?;
                    Ok((record, ballot, None))
                }
            }
        }
        .await;

        finish(tx, enrollment_id, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{ADVISOR, test_service};
    use rstest::rstest;

    use VoteDecision::{Approve, Reject};

    fn logged(origin: TransitionOrigin) -> Transition {
        Transition {
            id: "trn-00000001".into(),
            approval_id: "apr-00000001".into(),
            seq: 1,
            from_status: ApprovalStatus::AdvisorApproved,
            to_status: ApprovalStatus::Denied,
            changed_by: "someone".into(),
            origin,
            reason: String::new(),
            changed_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(ApprovalStatus::AdvisorApproved, None, true)]
    #[case(ApprovalStatus::Registered, None, false)]
    #[case(ApprovalStatus::Pending, None, false)]
    #[case(ApprovalStatus::Denied, Some(TransitionOrigin::Committee), true)]
    #[case(ApprovalStatus::Denied, Some(TransitionOrigin::Advisor), false)]
    #[case(ApprovalStatus::CommitteeApproved, Some(TransitionOrigin::Committee), true)]
    #[case(ApprovalStatus::CommitteeApproved, Some(TransitionOrigin::Administrator), false)]
    #[case(ApprovalStatus::DocumentApproved, Some(TransitionOrigin::Administrator), false)]
    fn voting_window(
        #[case] status: ApprovalStatus,
        #[case] origin: Option<TransitionOrigin>,
        #[case] open: bool,
    ) {
        let latest = origin.map(logged);
        assert_eq!(voting_open(status, latest.as_ref()), open);
    }

    async fn ready_for_vote(size: usize) -> ApprovalService<crate::directory::StaticDirectory> {
        let svc = test_service(&["enr-1"], size).await;
        svc.create_approval_record("enr-1", None).await.unwrap();
        svc.advisor_decision("enr-1", ADVISOR, true, "ok").await.unwrap();
        svc
    }

    #[tokio::test]
    async fn ballot_before_quorum_keeps_status() {
        let svc = ready_for_vote(5).await;
        let record = svc.committee_vote("enr-1", "ins-1", Approve, "").await.unwrap();
        assert_eq!(record.status, ApprovalStatus::AdvisorApproved);
        assert_eq!(record.version, 2);
        assert!(svc.has_voted("enr-1", "ins-1").await.unwrap());
    }

    #[tokio::test]
    async fn ballot_refreshes_attention_clock() {
        let svc = ready_for_vote(5)
            .await
            .with_attention_threshold(chrono::Duration::milliseconds(50));
        let after_advisor = svc.get_record("enr-1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
        assert!(svc.get_approval_status("enr-1").await.unwrap().needs_attention);

        let after_vote = svc.committee_vote("enr-1", "ins-1", Approve, "").await.unwrap();
        assert!(after_vote.updated_at > after_advisor.updated_at);
        assert_eq!(after_vote.version, after_advisor.version + 1);

        let view = svc.get_approval_status("enr-1").await.unwrap();
        assert!(!view.needs_attention);
        assert_eq!(view.status_updated_at, after_vote.updated_at);
    }

    #[tokio::test]
    async fn quorum_decides_with_deciding_voter() {
        let svc = ready_for_vote(3).await;
        svc.committee_vote("enr-1", "ins-1", Approve, "").await.unwrap();
        let record = svc.committee_vote("enr-1", "ins-2", Approve, "").await.unwrap();
        assert_eq!(record.status, ApprovalStatus::CommitteeApproved);

        let history = svc.get_transition_history("enr-1").await.unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.origin, TransitionOrigin::Committee);
        assert_eq!(last.changed_by, "ins-2");
        assert_eq!(last.reason, COMMITTEE_DECISION_REASON);
        assert_eq!(record.remarks, "ok");
    }

    #[tokio::test]
    async fn tie_at_quorum_denies() {
        let svc = ready_for_vote(2).await;
        svc.committee_vote("enr-1", "ins-1", Approve, "").await.unwrap();
        let record = svc.committee_vote("enr-1", "ins-2", Reject, "").await.unwrap();
        assert_eq!(record.status, ApprovalStatus::Denied);
    }

    #[tokio::test]
    async fn second_ballot_is_already_voted() {
        let svc = ready_for_vote(5).await;
        svc.committee_vote("enr-1", "ins-1", Approve, "").await.unwrap();
        let err = svc
            .committee_vote("enr-1", "ins-1", Reject, "changed my mind")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyVoted { .. }));
        assert_eq!(svc.get_votes("enr-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn outsider_is_not_authorized() {
        let svc = ready_for_vote(3).await;
        let err = svc
            .committee_vote("enr-1", "ins-99", Approve, "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::NotAuthorized { role: ActorRole::CommitteeMember, .. }
        ));
    }

    #[tokio::test]
    async fn voting_before_advisor_is_closed() {
        let svc = test_service(&["enr-1"], 3).await;
        svc.create_approval_record("enr-1", None).await.unwrap();
        let err = svc
            .committee_vote("enr-1", "ins-1", Approve, "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::VotingClosed { status: ApprovalStatus::Registered, .. }
        ));
    }

    #[tokio::test]
    async fn unknown_record_is_not_found_before_directory() {
        let svc = test_service(&[], 3).await;
        let err = svc
            .committee_vote("enr-404", "ins-1", Approve, "")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }

    #[tokio::test]
    async fn late_ballot_recorded_without_reevaluation() {
        let svc = ready_for_vote(3).await;
        svc.committee_vote("enr-1", "ins-1", Reject, "").await.unwrap();
        let decided = svc.committee_vote("enr-1", "ins-2", Reject, "").await.unwrap();
        assert_eq!(decided.status, ApprovalStatus::Denied);

        let late = svc.committee_vote("enr-1", "ins-3", Approve, "").await.unwrap();
        assert_eq!(late.status, ApprovalStatus::Denied);
        assert_eq!(late.version, decided.version + 1);
        assert!(late.updated_at >= decided.updated_at);
        assert_eq!(svc.get_votes("enr-1").await.unwrap().len(), 3);
        assert_eq!(svc.get_transition_history("enr-1").await.unwrap().len(), 2);
    }
}
