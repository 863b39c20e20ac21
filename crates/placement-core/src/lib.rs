//! # placement-core
//!
//! Core types shared across the placement approval crates:
//! - Status enums with the approval state machine
//! - Entity structs for approval records, committee votes, and transitions
//! - Committee consensus rules (quorum, majority of votes cast)
//! - ID prefix constants
//! - Cross-cutting workflow error type
//! - Read views returned by the query operations
//! - Status-changed event payload

pub mod consensus;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod events;
pub mod ids;
pub mod responses;
