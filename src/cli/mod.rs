//! CLI command modules
//!
//! Each subcommand has its own module with argument definitions and handlers.

pub mod config;
pub mod endpoints;
pub mod scan;
pub mod signal;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "eth-log-scheduler")]
#[command(
    version,
    about = "Fetch EVM logs over a block range, spread across several RPC endpoints"
)]
#[command(after_help = r#"EXAMPLES:
    # Scan the last 50,000 blocks with the default Sepolia endpoints
    eth-log-scheduler

    # Scan an explicit range in batches of 500 blocks
    eth-log-scheduler -f 5000000 -t 5100000 --batch-size 500

    # Use only your own endpoints
    eth-log-scheduler --rpc local=http://localhost:8545 --rpc backup=https://rpc.example.com

    # Machine-readable summary
    eth-log-scheduler --json -q

ENVIRONMENT VARIABLES:
    CONTRACT_ADDRESS    Contract to fetch logs from
    EVENT_TOPIC         Event topic (topic0) to filter on
    RUST_LOG            Overrides the -v log level

CONFIG FILE:
    Default: ~/.config/eth-log-scheduler/config.toml
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub scan: scan::ScanArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a block range (the default when no subcommand is given)
    Scan(scan::ScanArgs),

    /// Manage and test RPC endpoints
    Endpoints {
        #[command(subcommand)]
        action: endpoints::EndpointCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: config::ConfigCommands,
    },
}
