//! Configuration types and defaults

mod endpoint;
mod file;

pub use endpoint::EndpointConfig;
pub use file::{ConfigFile, DisabledEndpoints, Settings};

use crate::error::{ConfigError, Result};
use crate::rpc::{default_endpoints, LogQuery};
use crate::scheduler::SchedulerConfig;
use alloy::primitives::{Address, B256};
use std::collections::HashSet;
use std::str::FromStr;

/// Blocks per task when none is configured
pub const DEFAULT_BATCH_SIZE: u64 = 1000;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocks behind the head scanned when no start block is given
pub const DEFAULT_WINDOW: u64 = 50_000;

/// Contract scanned when none is configured
pub const DEFAULT_CONTRACT: &str = "0x761d53b47334bee6612c0bd1467fb881435375b2";

/// Event topic scanned when none is configured
pub const DEFAULT_TOPIC: &str =
    "0x3e54d0825ed78523037d00a81759237eb436ce774bd546993ee67a1b67b6e766";

/// First name that appears twice, if any
pub(crate) fn first_duplicate<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .find(|name| !seen.insert(*name))
        .map(str::to_string)
}

/// Block range end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockNumber {
    Number(u64),
    Latest,
}

impl FromStr for BlockNumber {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("latest") {
            return Ok(BlockNumber::Latest);
        }
        let n = match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.replace('_', "").parse(),
        };
        n.map(BlockNumber::Number)
            .map_err(|_| ConfigError::InvalidBlockNumber(s.to_string()))
    }
}

/// Resolved configuration for one scan
#[derive(Debug, Clone)]
pub struct Config {
    /// Contract and topic to fetch
    pub query: LogQuery,
    /// Enabled endpoints
    pub endpoints: Vec<EndpointConfig>,
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Blocks behind the head scanned when no start block is given
    pub window: u64,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for [`Config`]; unset fields fall back to the defaults above
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    contract: Option<String>,
    topic: Option<String>,
    endpoints: Vec<EndpointConfig>,
    /// Endpoint names or URLs left out of the final list
    disabled: Vec<String>,
    batch_size: Option<u64>,
    queue_capacity: Option<usize>,
    timeout_secs: Option<u64>,
    window: Option<u64>,
}

impl ConfigBuilder {
    /// Seed the builder from a config file
    pub fn from_file(file: &ConfigFile) -> Self {
        Self {
            contract: file.contract.clone(),
            topic: file.topic.clone(),
            endpoints: file.endpoints.clone(),
            disabled: file.disabled_endpoints.names.clone(),
            batch_size: Some(file.settings.batch_size),
            queue_capacity: file.settings.queue_capacity,
            timeout_secs: Some(file.settings.timeout_seconds),
            window: Some(file.settings.window),
        }
    }

    pub fn contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Replace the endpoint list
    pub fn endpoints(mut self, endpoints: Vec<EndpointConfig>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn add_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        if !self.endpoints.iter().any(|e| e.url == endpoint.url) {
            self.endpoints.push(endpoint);
        }
        self
    }

    /// Leave out an endpoint by name or URL, whichever list it ends up in
    pub fn disable(mut self, name_or_url: impl Into<String>) -> Self {
        self.disabled.push(name_or_url.into());
        self
    }

    pub fn batch_size(mut self, blocks: u64) -> Self {
        self.batch_size = Some(blocks);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn window(mut self, blocks: u64) -> Self {
        self.window = Some(blocks);
        self
    }

    pub fn build(self) -> Result<Config> {
        let contract = self.contract.as_deref().unwrap_or(DEFAULT_CONTRACT);
        let contract = Address::from_str(contract)
            .map_err(|_| ConfigError::InvalidAddress(contract.to_string()))?;

        let topic = self.topic.as_deref().unwrap_or(DEFAULT_TOPIC);
        let topic =
            B256::from_str(topic).map_err(|_| ConfigError::InvalidTopic(topic.to_string()))?;

        if self.batch_size == Some(0) {
            return Err(ConfigError::ZeroBatchSize.into());
        }
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::ZeroQueueCapacity.into());
        }

        let endpoints = if self.endpoints.is_empty() {
            default_endpoints()
        } else {
            self.endpoints
        };
        let disabled = &self.disabled;
        let endpoints: Vec<_> = endpoints
            .into_iter()
            .filter(|e| e.enabled && !disabled.iter().any(|d| *d == e.name || *d == e.url))
            .collect();
        if endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints.into());
        }
        if let Some(name) = first_duplicate(endpoints.iter().map(|e| e.name.as_str())) {
            return Err(ConfigError::DuplicateEndpoint(name).into());
        }

        Ok(Config {
            query: LogQuery::new(contract, topic),
            endpoints,
            scheduler: SchedulerConfig {
                batch_size: self.batch_size,
                queue_capacity: self.queue_capacity,
                ..Default::default()
            },
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            window: self.window.unwrap_or(DEFAULT_WINDOW),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(
            config.query.contract,
            Address::from_str(DEFAULT_CONTRACT).unwrap()
        );
        assert_eq!(config.endpoints.len(), default_endpoints().len());
        assert_eq!(config.scheduler.batch_size, None);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.window, DEFAULT_WINDOW);
    }

    #[test]
    fn test_invalid_contract() {
        let err = Config::builder().contract("0x1234").build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_invalid_topic() {
        let err = Config::builder().topic("Transfer").build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidTopic(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Config::builder().batch_size(0).build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ZeroBatchSize)));
    }

    #[test]
    fn test_all_endpoints_disabled() {
        let err = Config::builder()
            .endpoints(vec![EndpointConfig::new("a", "http://a").with_enabled(false)])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NoEndpoints)));
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = ConfigFile::default();
        file.settings.batch_size = 250;
        file.endpoints.push(EndpointConfig::new("local", "http://localhost:8545"));

        let config = ConfigBuilder::from_file(&file)
            .batch_size(100)
            .add_endpoint(EndpointConfig::new("dup", "http://localhost:8545"))
            .build()
            .unwrap();

        assert_eq!(config.scheduler.batch_size, Some(100));
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.endpoints[0].name, "local");
    }

    #[test]
    fn test_file_disables_default_endpoint() {
        let mut file = ConfigFile::default();
        file.disabled_endpoints.names.push("ankr".to_string());

        let config = ConfigBuilder::from_file(&file).build().unwrap();
        let names: Vec<_> = config.endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), default_endpoints().len() - 1);
        assert!(!names.contains(&"ankr"));
    }

    #[test]
    fn test_disabling_every_file_endpoint_is_an_error() {
        let mut file = ConfigFile::default();
        file.endpoints.push(EndpointConfig::new("local", "http://localhost:8545"));
        file.disabled_endpoints.names.push("http://localhost:8545".to_string());

        let err = ConfigBuilder::from_file(&file).build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NoEndpoints)));
    }

    #[test]
    fn test_disable_by_name_or_url() {
        let config = Config::builder()
            .endpoints(vec![
                EndpointConfig::new("a", "http://a"),
                EndpointConfig::new("b", "http://b"),
                EndpointConfig::new("c", "http://c"),
            ])
            .disable("a")
            .disable("http://c")
            .build()
            .unwrap();
        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.endpoints[0].name, "b");
    }

    #[test]
    fn test_duplicate_endpoint_name_rejected() {
        let err = Config::builder()
            .endpoints(vec![EndpointConfig::new("a", "http://x")])
            .add_endpoint(EndpointConfig::parse("a=http://y"))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::DuplicateEndpoint(name)) if name == "a"
        ));
    }

    #[test]
    fn test_first_duplicate() {
        assert_eq!(first_duplicate(["a", "b", "c"]), None);
        assert_eq!(first_duplicate(["a", "b", "a", "b"]), Some("a".to_string()));
    }

    #[test]
    fn test_parse_block_number() {
        assert_eq!("latest".parse::<BlockNumber>().unwrap(), BlockNumber::Latest);
        assert_eq!("LATEST".parse::<BlockNumber>().unwrap(), BlockNumber::Latest);
        assert_eq!(
            "1_000_000".parse::<BlockNumber>().unwrap(),
            BlockNumber::Number(1_000_000)
        );
        assert_eq!("0xff".parse::<BlockNumber>().unwrap(), BlockNumber::Number(255));
        assert!("soon".parse::<BlockNumber>().is_err());
    }
}
