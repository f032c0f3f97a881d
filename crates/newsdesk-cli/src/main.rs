use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod context;
mod display;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("newsdesk error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // `.env` must be loaded before parsing so env-backed flags see it.
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose)?;
    tracing::info!("newsdesk v{}", env!("CARGO_PKG_VERSION"));

    let ctx = context::AppContext::new(cli.settings);
    commands::dispatch(cli.command, &ctx).await
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("init tracing: {e}"))
}
