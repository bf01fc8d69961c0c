//! RPC endpoint management commands

use clap::Subcommand;
use eth_log_scheduler::{default_endpoints, ConfigFile, Endpoint, EndpointConfig, HttpEndpoint};
use std::time::Instant;

#[derive(Subcommand)]
pub enum EndpointCommands {
    /// List all configured endpoints
    List,

    /// Check that an endpoint answers and report its head block
    Test {
        /// RPC URL to test (or name=url)
        url: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,
    },
}

pub async fn handle(action: &EndpointCommands) -> anyhow::Result<()> {
    match action {
        EndpointCommands::List => {
            let file = ConfigFile::load_default().ok().flatten().unwrap_or_default();
            let custom = file.endpoints.clone();
            let endpoints = if custom.is_empty() {
                default_endpoints()
            } else {
                custom
            };

            println!("RPC ENDPOINTS ({})\n", endpoints.len());
            for ep in &endpoints {
                let state = if !ep.enabled || file.is_endpoint_disabled(ep) {
                    " [disabled]"
                } else {
                    ""
                };
                println!(
                    "  {:<12} {}{}{}",
                    ep.name,
                    ep.url,
                    state,
                    ep.note
                        .as_ref()
                        .map(|n| format!(" ({})", n))
                        .unwrap_or_default()
                );
            }
        }

        EndpointCommands::Test { url, timeout } => {
            let config = EndpointConfig::parse(url);
            println!("Testing endpoint: {} ({})\n", config.name, config.url);

            print!("[1/2] Client.................... ");
            std::io::Write::flush(&mut std::io::stdout())?;
            let endpoint = match HttpEndpoint::new(config, *timeout) {
                Ok(ep) => {
                    println!("✓ OK");
                    ep
                }
                Err(e) => {
                    println!("✗ FAILED: {}", e);
                    return Ok(());
                }
            };

            print!("[2/2] Current block............. ");
            std::io::Write::flush(&mut std::io::stdout())?;
            let start = Instant::now();
            match endpoint.latest_block().await {
                Ok(block) => println!("✓ Block {} ({:?})", block, start.elapsed()),
                Err(e) => println!("✗ FAILED: {}", e),
            }

            println!("\nEndpoint test complete.");
        }
    }

    Ok(())
}
