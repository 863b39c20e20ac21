use placement_core::enums::VoteDecision;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AdvisorArgs;
use crate::commands::shared::parse::parse_decision;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc advisor`.
pub async fn handle(args: &AdvisorArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let approved = parse_decision(&args.decision)? == VoteDecision::Approve;
    let record = ctx
        .service
        .advisor_decision(&args.enrollment, &args.advisor, approved, &args.remarks)
        .await?;
    output(&record, flags.format)
}
