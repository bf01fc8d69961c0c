//! Set of connected endpoints handed to the scheduler

use crate::config::EndpointConfig;
use crate::error::{Result, RpcError};
use crate::rpc::{Endpoint, HttpEndpoint, StatsSnapshot};
use std::sync::Arc;

/// Pool of RPC endpoints, one scheduler worker each
pub struct RpcPool {
    endpoints: Vec<Arc<dyn Endpoint>>,
}

impl RpcPool {
    /// Create HTTP endpoints for every config, skipping the ones that fail
    pub fn connect(configs: &[EndpointConfig], timeout_secs: u64) -> Result<Self> {
        let mut endpoints: Vec<Arc<dyn Endpoint>> = Vec::new();
        for cfg in configs.iter().filter(|c| c.enabled) {
            match HttpEndpoint::new(cfg.clone(), timeout_secs) {
                Ok(ep) => {
                    tracing::info!("Connected to {}", cfg.name);
                    endpoints.push(Arc::new(ep));
                }
                Err(e) => {
                    tracing::warn!("Failed to create endpoint {}: {}", cfg.name, e);
                }
            }
        }

        Self::from_endpoints(endpoints)
    }

    /// Build a pool from already constructed endpoints
    pub fn from_endpoints(endpoints: Vec<Arc<dyn Endpoint>>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(RpcError::NoUsableEndpoints.into());
        }
        Ok(Self { endpoints })
    }

    /// Get number of available endpoints
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn endpoints(&self) -> &[Arc<dyn Endpoint>] {
        &self.endpoints
    }

    /// Get current block number, trying endpoints in order
    pub async fn latest_block(&self) -> Result<u64> {
        for endpoint in &self.endpoints {
            match endpoint.latest_block().await {
                Ok(block) => return Ok(block),
                Err(e) => {
                    tracing::debug!("Failed to get block number from {}: {}", endpoint.name(), e);
                }
            }
        }

        Err(RpcError::HeadUnavailable.into())
    }

    /// Statistics for every endpoint, in pool order
    pub fn stats(&self) -> Vec<StatsSnapshot> {
        self.endpoints.iter().map(|e| e.stats().snapshot()).collect()
    }

    /// List all endpoint names
    pub fn list_endpoints(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.name()).collect()
    }
}
