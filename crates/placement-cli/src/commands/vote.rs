use crate::cli::GlobalFlags;
use crate::cli::root_commands::VoteArgs;
use crate::commands::shared::parse::parse_decision;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc vote`.
pub async fn handle(args: &VoteArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let decision = parse_decision(&args.decision)?;
    let record = ctx
        .service
        .committee_vote(&args.enrollment, &args.voter, decision, &args.remarks)
        .await?;
    output(&record, flags.format)
}
