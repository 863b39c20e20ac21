use crate::cli::GlobalFlags;
use crate::cli::root_commands::CreateArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc create`.
pub async fn handle(args: &CreateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let record = ctx
        .service
        .create_approval_record(&args.enrollment, args.advisor.as_deref())
        .await?;
    output(&record, flags.format)
}
