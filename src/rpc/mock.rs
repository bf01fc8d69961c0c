//! In-process endpoint with scripted latency and failures
//!
//! Latency is simulated with `tokio::time::sleep`, so tests running on a
//! paused clock observe it deterministically.

use super::{Endpoint, EndpointStats, LogQuery};
use crate::error::RpcError;
use alloy::rpc::types::Log;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// When a [`MockEndpoint`] should fail a `fetch_logs` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every call succeeds
    Never,
    /// Every call fails
    Always,
    /// The first `n` calls fail, the rest succeed
    FirstN(u64),
}

/// A recorded `fetch_logs` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCall {
    pub from_block: u64,
    pub to_block: u64,
    pub started_at: Instant,
}

/// Endpoint double for exercising the scheduler without a network
pub struct MockEndpoint {
    name: String,
    latency: Duration,
    logs_per_call: usize,
    failure: FailureMode,
    latest_block: u64,
    calls: Mutex<Vec<MockCall>>,
    stats: EndpointStats,
}

impl MockEndpoint {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stats: EndpointStats::new(name.clone()),
            name,
            latency: Duration::ZERO,
            logs_per_call: 0,
            failure: FailureMode::Never,
            latest_block: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of logs returned by each successful call
    pub fn with_logs_per_call(mut self, count: usize) -> Self {
        self.logs_per_call = count;
        self
    }

    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    pub fn with_latest_block(mut self, block: u64) -> Self {
        self.latest_block = block;
        self
    }

    /// Calls made so far, in start order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn should_fail(&self, call_index: u64) -> bool {
        match self.failure {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::FirstN(n) => call_index < n,
        }
    }
}

#[async_trait]
impl Endpoint for MockEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_logs(
        &self,
        _query: &LogQuery,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError> {
        let started_at = Instant::now();
        let call_index = match self.calls.lock() {
            Ok(mut calls) => {
                calls.push(MockCall {
                    from_block,
                    to_block,
                    started_at,
                });
                calls.len() as u64 - 1
            }
            Err(_) => return Err(RpcError::Provider("mock state poisoned".to_string())),
        };

        tokio::time::sleep(self.latency).await;

        let fail = self.should_fail(call_index);
        self.stats.record(started_at.elapsed(), !fail);

        if fail {
            Err(RpcError::ConnectionFailed(format!(
                "{}: simulated failure for blocks {}-{}",
                self.name, from_block, to_block
            )))
        } else {
            Ok(vec![Log::default(); self.logs_per_call])
        }
    }

    async fn latest_block(&self) -> Result<u64, RpcError> {
        Ok(self.latest_block)
    }

    fn stats(&self) -> &EndpointStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256};

    fn query() -> LogQuery {
        LogQuery::new(Address::ZERO, B256::ZERO)
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_and_logs() {
        let mock = MockEndpoint::new("m")
            .with_latency(Duration::from_millis(50))
            .with_logs_per_call(3);

        let start = Instant::now();
        let logs = mock.fetch_logs(&query(), 0, 9).await.unwrap();
        assert_eq!(logs.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(mock.stats().total_requests(), 1);
        assert_eq!(mock.calls()[0].to_block, 9);
    }

    #[tokio::test]
    async fn test_first_n_failures() {
        let mock = MockEndpoint::new("m").with_failure(FailureMode::FirstN(2));

        assert!(mock.fetch_logs(&query(), 0, 0).await.is_err());
        assert!(mock.fetch_logs(&query(), 1, 1).await.is_err());
        assert!(mock.fetch_logs(&query(), 2, 2).await.is_ok());
        assert_eq!(mock.stats().failures(), 2);
        assert_eq!(mock.call_count(), 3);
    }
}
