use anyhow::bail;
use placement_core::entities::{ApprovalRecord, Transition, Vote};
use placement_core::events::StatusChanged;
use placement_core::responses::{ApprovalView, CommitteeVotingData, StatusCatalogEntry};
use schemars::{Schema, schema_for};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Names accepted by `plc schema`.
pub const SCHEMA_TYPES: &[&str] = &[
    "approval-record",
    "approval-view",
    "committee-voting-data",
    "status-changed",
    "status-catalog-entry",
    "transition",
    "vote",
];

fn schema_by_name(name: &str) -> Option<Schema> {
    let schema = match name {
        "approval-record" => schema_for!(ApprovalRecord),
        "approval-view" => schema_for!(ApprovalView),
        "committee-voting-data" => schema_for!(CommitteeVotingData),
        "status-changed" => schema_for!(StatusChanged),
        "status-catalog-entry" => schema_for!(StatusCatalogEntry),
        "transition" => schema_for!(Transition),
        "vote" => schema_for!(Vote),
        _ => return None,
    };
    Some(schema)
}

/// Handle `plc schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(schema) = schema_by_name(&args.type_name) else {
        bail!(
            "unknown schema type '{}' (expected one of: {})",
            args.type_name,
            SCHEMA_TYPES.join(", ")
        );
    };
    output(&schema, flags.format)
}
