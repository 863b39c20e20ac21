use crate::cli::GlobalFlags;
use crate::cli::root_commands::ListArgs;
use crate::commands::shared::parse::parse_status;
use crate::context::AppContext;
use crate::output::output;

/// Handle `plc list`.
pub async fn handle(args: &ListArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = args.status.as_deref().map(parse_status).transpose()?;
    let limit = flags.limit.unwrap_or(ctx.config.general.default_limit);
    let records = ctx
        .service
        .list_by_status(status, limit, args.offset)
        .await?;
    output(&records, flags.format)
}
