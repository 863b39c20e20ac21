//! ID prefixes for generated identifiers.
//!
//! IDs are `{prefix}-{8 hex chars}` (e.g. `apr-a3f8b2c1`), generated in SQL by
//! `ApprovalDb::generate_id`.

pub const PREFIX_APPROVAL: &str = "apr";
pub const PREFIX_VOTE: &str = "vot";
pub const PREFIX_TRANSITION: &str = "trn";

pub const ALL_PREFIXES: &[&str] = &[PREFIX_APPROVAL, PREFIX_VOTE, PREFIX_TRANSITION];

/// Check that `id` has the shape `{prefix}-{8 hex chars}`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
