//! Configuration management commands

use clap::Subcommand;
use eth_log_scheduler::ConfigFile;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show config file path
    Path,

    /// Show current config
    Show,

    /// Write a config file with the default settings and endpoints
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle(action: &ConfigCommands) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Path => {
            println!("{}", ConfigFile::default_path().display());
        }

        ConfigCommands::Show => {
            let path = ConfigFile::default_path();
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                println!("# {}\n", path.display());
                println!("{}", content);
            } else {
                println!("No config file found at: {}", path.display());
                println!("\nCreate one with:");
                println!("  eth-log-scheduler config init");
            }
        }

        ConfigCommands::Init { force } => {
            let path = ConfigFile::default_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }

            let config = ConfigFile {
                endpoints: eth_log_scheduler::default_endpoints(),
                ..Default::default()
            };
            config.save(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
