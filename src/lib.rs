//! eth-log-scheduler - Pull-based EVM log fetching across redundant RPC endpoints
//!
//! A block range is split into fixed-size tasks that one worker per
//! endpoint pulls from a shared queue. Fast endpoints naturally take more
//! tasks; an endpoint that keeps failing backs off exponentially. The
//! caller gets the aggregate log count and per-endpoint statistics.
//!
//! # Example
//!
//! ```rust,no_run
//! use eth_log_scheduler::{Config, RpcPool, Scheduler};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::builder()
//!         .contract("0x761d53b47334bee6612c0bd1467fb881435375b2")
//!         .batch_size(1000)
//!         .build()?;
//!
//!     let pool = RpcPool::connect(&config.endpoints, config.timeout_secs)?;
//!     let latest = pool.latest_block().await?;
//!
//!     let scheduler = Scheduler::from_pool(&pool, config.query, config.scheduler)?;
//!     let report = scheduler
//!         .run(latest.saturating_sub(50_000), latest, &CancellationToken::new())
//!         .await?;
//!
//!     println!("Found {} logs", report.total_logs);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod rpc;
pub mod scheduler;

// Re-exports for convenience
pub use config::{BlockNumber, Config, ConfigBuilder, ConfigFile, EndpointConfig};
pub use error::{ConfigError, Error, Result, RpcError, SchedulerError};
pub use rpc::{
    default_endpoints, Endpoint, EndpointStats, HttpEndpoint, LogQuery, RpcPool, StatsSnapshot,
};
pub use scheduler::{
    count_tasks, BackoffPolicy, RunProgress, RunReport, Scheduler, SchedulerConfig, Task,
    TaskRanges, TaskResult,
};
