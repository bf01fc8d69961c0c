//! eth-log-scheduler CLI - spread EVM log fetching across RPC endpoints

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match &cli.command {
        Some(Commands::Endpoints { action }) => cli::endpoints::handle(action).await,
        Some(Commands::Config { action }) => cli::config::handle(action),
        Some(Commands::Scan(args)) => cli::scan::handle(args, cli.quiet).await,
        None => cli::scan::handle(&cli.scan, cli.quiet).await,
    }
}
