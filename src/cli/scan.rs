//! Scan command - fetch logs over a block range

use clap::Args;
use eth_log_scheduler::{
    BlockNumber, Config, ConfigBuilder, ConfigFile, EndpointConfig, RpcPool, RunProgress,
    RunReport, Scheduler,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Args)]
pub struct ScanArgs {
    /// Contract address to fetch logs from
    #[arg(short, long, env = "CONTRACT_ADDRESS")]
    pub contract: Option<String>,

    /// Event topic (topic0) to filter on
    #[arg(short = 'e', long, env = "EVENT_TOPIC")]
    pub topic: Option<String>,

    /// Start block (default: end block minus --window)
    #[arg(short = 'f', long)]
    pub from_block: Option<u64>,

    /// End block number (or "latest")
    #[arg(short = 't', long, default_value = "latest")]
    pub to_block: String,

    /// Blocks behind the end block to scan when --from-block is not given
    #[arg(long)]
    pub window: Option<u64>,

    /// Blocks per task
    #[arg(short, long)]
    pub batch_size: Option<u64>,

    /// Task queue capacity (default: twice the endpoint count)
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Use only this RPC endpoint, as name=url or url (can be repeated)
    #[arg(long = "rpc", action = clap::ArgAction::Append)]
    pub rpc_urls: Vec<String>,

    /// Add RPC to the endpoint set (can be repeated)
    #[arg(long = "add-rpc", action = clap::ArgAction::Append)]
    pub add_rpc: Vec<String>,

    /// Exclude RPC by name or URL (can be repeated)
    #[arg(long = "exclude-rpc", action = clap::ArgAction::Append)]
    pub exclude_rpc: Vec<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Config file (default: ~/.config/eth-log-scheduler/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    elapsed_secs: f64,
    blocks_per_second: f64,
    stopped: Option<String>,
}

pub async fn handle(args: &ScanArgs, quiet: bool) -> anyhow::Result<()> {
    let file = match &args.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::load_default().ok().flatten(),
    };
    let config = build_config(args, file.as_ref())?;

    if !quiet {
        eprintln!("Connecting to {} RPC endpoints...", config.endpoints.len());
    }
    let pool = RpcPool::connect(&config.endpoints, config.timeout_secs)?;
    tracing::info!("Using endpoints: {}", pool.list_endpoints().join(", "));

    let (from_block, to_block) = resolve_range(args, &config, &pool).await?;
    tracing::info!("Scanning blocks {} to {}", from_block, to_block);

    let cancel = CancellationToken::new();
    crate::cli::signal::cancel_on_signal(cancel.clone());

    let pb = if quiet { None } else { Some(progress_bar()) };
    let pb_clone = pb.clone();
    let scheduler = Scheduler::from_pool(&pool, config.query, config.scheduler.clone())?
        .with_progress(move |progress: RunProgress| {
            if let Some(ref pb) = pb_clone {
                pb.set_length(progress.total_tasks);
                pb.set_position(progress.completed);
                pb.set_message(format!(
                    "{} logs, {} failed",
                    progress.total_logs, progress.failed
                ));
            }
        });

    let start = Instant::now();
    let (report, stopped) = match scheduler.run(from_block, to_block, &cancel).await {
        Ok(report) => (report, None),
        Err(e) => {
            let reason = e.to_string();
            (e.into_partial(), Some(reason))
        }
    };
    let elapsed = start.elapsed();
    cancel.cancel();

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    print_summary(&report, elapsed, stopped.as_deref(), args.json)?;
    Ok(())
}

/// Merge the config file and command-line arguments; arguments win
fn build_config(args: &ScanArgs, file: Option<&ConfigFile>) -> anyhow::Result<Config> {
    let mut builder = file.map(ConfigBuilder::from_file).unwrap_or_default();

    if let Some(contract) = &args.contract {
        builder = builder.contract(contract);
    }
    if let Some(topic) = &args.topic {
        builder = builder.topic(topic);
    }
    if let Some(batch_size) = args.batch_size {
        builder = builder.batch_size(batch_size);
    }
    if let Some(capacity) = args.queue_capacity {
        builder = builder.queue_capacity(capacity);
    }
    if let Some(timeout) = args.timeout {
        builder = builder.timeout_secs(timeout);
    }
    if let Some(window) = args.window {
        builder = builder.window(window);
    }

    if !args.rpc_urls.is_empty() {
        let endpoints = args.rpc_urls.iter().map(|s| EndpointConfig::parse(s));
        builder = builder.endpoints(endpoints.collect());
    }
    for spec in &args.add_rpc {
        builder = builder.add_endpoint(EndpointConfig::parse(spec));
    }

    for excluded in &args.exclude_rpc {
        builder = builder.disable(excluded);
    }

    Ok(builder.build()?)
}

async fn resolve_range(
    args: &ScanArgs,
    config: &Config,
    pool: &RpcPool,
) -> anyhow::Result<(u64, u64)> {
    let to_block = match args.to_block.parse::<BlockNumber>()? {
        BlockNumber::Number(n) => n,
        BlockNumber::Latest => {
            let latest = pool.latest_block().await?;
            tracing::info!("Latest block: {}", latest);
            latest
        }
    };
    let from_block = args
        .from_block
        .unwrap_or_else(|| to_block.saturating_sub(config.window));

    if from_block > to_block {
        anyhow::bail!(
            "Start block {} is after end block {}",
            from_block,
            to_block
        );
    }
    Ok((from_block, to_block))
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tasks ({msg})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

fn print_summary(
    report: &RunReport,
    elapsed: Duration,
    stopped: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let secs = elapsed.as_secs_f64();
    let blocks_per_second = if secs > 0.0 {
        report.block_count() as f64 / secs
    } else {
        0.0
    };

    if json {
        let summary = Summary {
            report,
            elapsed_secs: secs,
            blocks_per_second,
            stopped: stopped.map(str::to_string),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if let Some(reason) = stopped {
        eprintln!("Scheduler stopped: {}", reason);
    }

    println!("=== Summary ===");
    println!(
        "Blocks scanned:   {} ({}-{})",
        report.block_count(),
        report.start_block,
        report.end_block
    );
    println!(
        "Tasks:            {}/{} ({} failed)",
        report.completed, report.total_tasks, report.failed
    );
    println!("Total logs found: {}", report.total_logs);
    println!("Time elapsed:     {:.2?}", elapsed);
    println!("Throughput:       {:.0} blocks/sec", blocks_per_second);

    println!("\n=== RPC Statistics ===");
    for s in &report.endpoint_stats {
        let tasks = report.tasks_by_worker.get(&s.name).copied().unwrap_or(0);
        println!(
            "  {:<12} tasks={:<6} requests={:<6} failures={:<6} avg_latency={:.2?}",
            s.name, tasks, s.total_requests, s.failures, s.average_latency
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> ScanArgs {
        let argv = std::iter::once("eth-log-scheduler").chain(args.iter().copied());
        crate::cli::Cli::parse_from(argv).scan
    }

    #[test]
    fn test_build_config_from_args() {
        let args = parse(&[
            "--rpc",
            "a=http://a.example",
            "--add-rpc",
            "http://b.example/rpc",
            "--batch-size",
            "250",
        ]);
        let config = build_config(&args, None).unwrap();

        let names: Vec<_> = config.endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b.example"]);
        assert_eq!(config.scheduler.batch_size, Some(250));
    }

    #[test]
    fn test_exclude_all_endpoints_fails() {
        let args = parse(&["--rpc", "a=http://a.example", "--exclude-rpc", "a"]);
        assert!(build_config(&args, None).is_err());
    }

    #[test]
    fn test_file_endpoints_used() {
        let mut file = ConfigFile::default();
        file.endpoints.push(EndpointConfig::new("local", "http://localhost:8545"));
        file.settings.batch_size = 42;

        let config = build_config(&parse(&[]), Some(&file)).unwrap();
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.scheduler.batch_size, Some(42));
    }
}
