use crate::cli::GlobalFlags;
use crate::cli::root_commands::EnrollmentArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc voting`.
pub async fn handle(args: &EnrollmentArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let data = ctx
        .service
        .get_committee_voting_data(&args.enrollment)
        .await?;
    output(&data, flags.format)
}
