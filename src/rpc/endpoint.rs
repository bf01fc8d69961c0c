//! Log-fetching endpoint capability

use super::EndpointStats;
use crate::error::RpcError;
use alloy::primitives::{Address, B256};
use alloy::rpc::types::{Filter, Log};
use async_trait::async_trait;

/// Contract and event the logs are fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub contract: Address,
    pub topic: B256,
}

impl LogQuery {
    pub fn new(contract: Address, topic: B256) -> Self {
        Self { contract, topic }
    }

    /// Build an `eth_getLogs` filter for an inclusive block range
    pub fn filter(&self, from_block: u64, to_block: u64) -> Filter {
        Filter::new()
            .address(self.contract)
            .event_signature(self.topic)
            .from_block(from_block)
            .to_block(to_block)
    }
}

/// A remote service that can return logs for a block range.
///
/// Every `fetch_logs` call must update [`Endpoint::stats`]. The scheduler
/// binds exactly one worker to each endpoint.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Identifier used for the worker and in statistics
    fn name(&self) -> &str;

    /// Fetch logs matching `query` in `[from_block, to_block]`
    async fn fetch_logs(
        &self,
        query: &LogQuery,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError>;

    /// Latest block number known to the endpoint
    async fn latest_block(&self) -> Result<u64, RpcError>;

    /// Request statistics for this endpoint
    fn stats(&self) -> &EndpointStats;
}
