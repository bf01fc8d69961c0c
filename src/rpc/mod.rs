//! RPC endpoint capability, implementations and statistics

mod client;
mod defaults;
mod endpoint;
pub mod mock;
mod pool;
mod stats;

pub use client::HttpEndpoint;
pub use defaults::default_endpoints;
pub use endpoint::{Endpoint, LogQuery};
pub use pool::RpcPool;
pub use stats::{EndpointStats, StatsSnapshot};
