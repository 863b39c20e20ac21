//! JsonSchema validation of the public read views.
//!
//! The schemas are what `plc schema` publishes; every view the engine builds
//! must validate against them.

use chrono::{Duration, Utc};
use schemars::schema_for;
use placement_core::entities::{ApprovalRecord, Transition, Vote};
use placement_core::enums::{ApprovalStatus, TransitionOrigin, VoteDecision};
use placement_core::events::StatusChanged;
use placement_core::responses::{ApprovalView, CommitteeVotingData, status_catalog};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! assert_matches_schema {
    ($ty:ty, $value:expr) => {{
        let schema = serde_json::to_value(schema_for!($ty)).unwrap();
        let instance = serde_json::to_value(&$value).unwrap();
        let errors = validate_against_schema(&schema, &instance);
        assert!(
            errors.is_empty(),
            "Schema validation failed for {}: {:?}",
            stringify!($ty),
            errors
        );
    }};
}

fn sample_votes() -> Vec<Vote> {
    let now = Utc::now();
    vec![
        Vote {
            id: "vot-00000001".into(),
            approval_id: "apr-00000001".into(),
            voter_id: "ins-1".into(),
            decision: VoteDecision::Approve,
            remarks: "strong placement".into(),
            seq: 1,
            voted_at: now,
        },
        Vote {
            id: "vot-00000002".into(),
            approval_id: "apr-00000001".into(),
            voter_id: "ins-2".into(),
            decision: VoteDecision::Reject,
            remarks: String::new(),
            seq: 2,
            voted_at: now,
        },
    ]
}

fn sample_transition() -> Transition {
    Transition {
        id: "trn-00000001".into(),
        approval_id: "apr-00000001".into(),
        seq: 1,
        from_status: ApprovalStatus::Registered,
        to_status: ApprovalStatus::AdvisorApproved,
        changed_by: "ins-advisor".into(),
        origin: TransitionOrigin::Advisor,
        reason: "approved".into(),
        changed_at: Utc::now(),
    }
}

#[test]
fn approval_view_matches_schema() {
    let now = Utc::now();
    let record = ApprovalRecord {
        id: "apr-00000001".into(),
        enrollment_id: "enr-1".into(),
        status: ApprovalStatus::AdvisorApproved,
        advisor_id: Some("ins-advisor".into()),
        advisor_approved_at: Some(now),
        remarks: "approved".into(),
        version: 1,
        created_at: now,
        updated_at: now - Duration::days(9),
    };
    let view = ApprovalView::assemble(
        record,
        sample_votes(),
        vec![sample_transition()],
        now,
        Duration::days(7),
    );
    assert!(view.needs_attention);
    assert_matches_schema!(ApprovalView, view);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["current_status"], "t.approved");
    assert_eq!(json["status_history"][0]["origin"], "advisor");
}

#[test]
fn voting_data_matches_schema() {
    let data = CommitteeVotingData::summarize("enr-1".into(), 3, sample_votes());
    assert_matches_schema!(CommitteeVotingData, data);

    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["final_decision"], "rejected");
}

#[test]
fn status_changed_event_matches_schema() {
    let event = StatusChanged::from_transition("enr-1", &sample_transition());
    assert_eq!(event.to, ApprovalStatus::AdvisorApproved);
    assert_matches_schema!(StatusChanged, event);
}

#[test]
fn catalog_serializes_wire_names() {
    let json = serde_json::to_value(status_catalog()).unwrap();
    let values: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["value"].as_str().unwrap())
        .collect();
    assert_eq!(
        values,
        [
            "registered",
            "pending",
            "t.approved",
            "c.approved",
            "doc.approved",
            "doc.cancel",
            "approve",
            "denied"
        ]
    );
}
