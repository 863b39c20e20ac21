use crate::cli::GlobalFlags;
use crate::cli::root_commands::EnrollmentArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc history`.
pub async fn handle(args: &EnrollmentArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let history = ctx
        .service
        .get_transition_history(&args.enrollment)
        .await?;
    output(&history, flags.format)
}
