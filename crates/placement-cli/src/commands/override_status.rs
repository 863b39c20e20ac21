use crate::cli::GlobalFlags;
use crate::cli::root_commands::OverrideArgs;
use crate::commands::shared::parse::parse_status;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc override`.
pub async fn handle(args: &OverrideArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = parse_status(&args.status)?;
    let record = ctx
        .service
        .admin_override(&args.enrollment, status, &args.by, &args.reason)
        .await?;
    output(&record, flags.format)
}
