use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Create(args) => commands::create::handle(&args, ctx, flags).await,
        Commands::Advisor(args) => commands::advisor::handle(&args, ctx, flags).await,
        Commands::Vote(args) => commands::vote::handle(&args, ctx, flags).await,
        Commands::Override(args) => commands::override_status::handle(&args, ctx, flags).await,
        Commands::Status(args) => commands::status::handle(&args, ctx, flags).await,
        Commands::Voting(args) => commands::voting::handle(&args, ctx, flags).await,
        Commands::History(args) => commands::history::handle(&args, ctx, flags).await,
        Commands::List(args) => commands::list::handle(&args, ctx, flags).await,
        Commands::Statuses => commands::statuses::handle(flags),
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
