use placement_core::responses::status_catalog;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `plc statuses`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&status_catalog(), flags.format)
}
