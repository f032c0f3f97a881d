mod classify;
mod fetch;
mod history;
mod init_db;
mod session;

use crate::cli::Commands;
use crate::context::AppContext;

pub async fn dispatch(command: Commands, ctx: &AppContext) -> anyhow::Result<()> {
    match command {
        Commands::Classify { name, text, json } => classify::run(ctx, &name, text, json).await,
        Commands::Session { name } => session::run(ctx, &name).await,
        Commands::Fetch => fetch::run(ctx).await,
        Commands::InitDb => init_db::run(ctx).await,
        Commands::History { limit, json } => history::run(ctx, limit, json).await,
    }
}

/// Wall-clock time for a new interaction, in the server's local zone.
fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
