//! HTTP JSON-RPC endpoint backed by an alloy provider

use super::{Endpoint, EndpointStats, LogQuery};
use crate::config::EndpointConfig;
use crate::error::RpcError;
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::Log;
use alloy::transports::http::reqwest::{self, Url};
use alloy::transports::http::Http;
use alloy::transports::TransportError;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// A single RPC node reached over HTTP
pub struct HttpEndpoint {
    config: EndpointConfig,
    provider: RootProvider,
    timeout_secs: u64,
    stats: EndpointStats,
}

impl HttpEndpoint {
    /// Create an endpoint with a per-request timeout
    pub fn new(config: EndpointConfig, timeout_secs: u64) -> Result<Self, RpcError> {
        let url = config
            .url
            .parse::<Url>()
            .map_err(|e| RpcError::InvalidUrl {
                url: config.url.clone(),
                reason: e.to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RpcError::ConnectionFailed(e.to_string()))?;

        let client = RpcClient::new(Http::with_client(http, url), false);
        Ok(Self::from_provider(
            config,
            RootProvider::new(client),
            timeout_secs,
        ))
    }

    /// Wrap an existing provider
    pub fn from_provider(
        config: EndpointConfig,
        provider: RootProvider,
        timeout_secs: u64,
    ) -> Self {
        let stats = EndpointStats::new(config.name.clone());
        Self {
            config,
            provider,
            timeout_secs,
            stats,
        }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Map a transport failure onto the crate's error kinds
    fn classify(&self, err: TransportError) -> RpcError {
        let msg = err.to_string();
        let lower = msg.to_lowercase();

        if lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("too many requests")
        {
            RpcError::RateLimited(self.config.name.clone())
        } else if lower.contains("timed out") || lower.contains("timeout") {
            RpcError::Timeout(self.timeout_secs)
        } else if err.is_transport_error() {
            RpcError::ConnectionFailed(msg)
        } else {
            RpcError::Provider(msg)
        }
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch_logs(
        &self,
        query: &LogQuery,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError> {
        let filter = query.filter(from_block, to_block);

        let start = Instant::now();
        let result = self.provider.get_logs(&filter).await;
        self.stats.record(start.elapsed(), result.is_ok());

        result.map_err(|e| self.classify(e))
    }

    async fn latest_block(&self) -> Result<u64, RpcError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| self.classify(e))
    }

    fn stats(&self) -> &EndpointStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U64};
    use alloy::transports::mock::Asserter;

    fn mocked(asserter: Asserter) -> HttpEndpoint {
        let provider = RootProvider::new(RpcClient::mocked(asserter));
        HttpEndpoint::from_provider(
            EndpointConfig::new("mock", "http://localhost:8545"),
            provider,
            30,
        )
    }

    fn query() -> LogQuery {
        LogQuery::new(Address::repeat_byte(0x11), B256::repeat_byte(0x22))
    }

    #[test]
    fn test_invalid_url() {
        let result = HttpEndpoint::new(EndpointConfig::new("bad", "not a url"), 30);
        assert!(matches!(result, Err(RpcError::InvalidUrl { .. })));
    }

    #[test]
    fn test_new_endpoint() {
        let endpoint =
            HttpEndpoint::new(EndpointConfig::new("local", "http://localhost:8545"), 30).unwrap();
        assert_eq!(endpoint.name(), "local");
        assert_eq!(endpoint.url(), "http://localhost:8545");
        assert_eq!(endpoint.stats().total_requests(), 0);
    }

    #[tokio::test]
    async fn test_fetch_logs_records_stats() {
        let asserter = Asserter::new();
        asserter.push_success(&Vec::<Log>::new());
        asserter.push_failure_msg("header not found");
        let endpoint = mocked(asserter);

        let logs = endpoint.fetch_logs(&query(), 0, 999).await.unwrap();
        assert!(logs.is_empty());

        let err = endpoint.fetch_logs(&query(), 1000, 1999).await.unwrap_err();
        assert!(matches!(err, RpcError::Provider(_)));

        let snap = endpoint.stats().snapshot();
        assert_eq!(snap.name, "mock");
        assert_eq!(snap.total_requests, 2);
        assert_eq!(snap.failures, 1);
    }

    #[tokio::test]
    async fn test_rate_limit_classified() {
        let asserter = Asserter::new();
        asserter.push_failure_msg("Too Many Requests");
        let endpoint = mocked(asserter);

        let err = endpoint.fetch_logs(&query(), 0, 10).await.unwrap_err();
        assert!(matches!(err, RpcError::RateLimited(name) if name == "mock"));
    }

    #[tokio::test]
    async fn test_latest_block_not_counted() {
        let asserter = Asserter::new();
        asserter.push_success(&U64::from(4_242_424u64));
        let endpoint = mocked(asserter);

        assert_eq!(endpoint.latest_block().await.unwrap(), 4_242_424);
        assert_eq!(endpoint.stats().total_requests(), 0);
    }
}
