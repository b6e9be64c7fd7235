//! Reckon CLI binary entry point.

use clap::Parser;
use reckon::cli::{commands, Cli, Commands};
use reckon::config::ReckonConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "reckon=info,tower_http=info";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ReckonConfig::load()?;
    match cli.command {
        Commands::Serve(args) => commands::handle_serve(args, config).await,
        Commands::Ask(args) => commands::handle_ask(args, config).await,
        Commands::Chat(args) => commands::handle_chat(args, config).await,
    }
}
