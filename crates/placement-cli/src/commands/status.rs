use crate::cli::GlobalFlags;
use crate::cli::root_commands::EnrollmentArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc status`.
pub async fn handle(args: &EnrollmentArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let view = ctx.service.get_approval_status(&args.enrollment).await?;
    output(&view, flags.format)
}
