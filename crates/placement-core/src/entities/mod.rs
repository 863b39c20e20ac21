//! Entity structs for the approval workflow.
//!
//! Each entity maps to a table in the libSQL database (see
//! `placement-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema`.

mod approval;
mod transition;
mod vote;

pub use approval::{ApprovalRecord, DEFAULT_ATTENTION_DAYS};
pub use transition::Transition;
pub use vote::Vote;
