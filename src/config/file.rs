//! TOML config file
//!
//! ```toml
//! contract = "0x..."
//! topic = "0x..."
//!
//! [settings]
//! batch_size = 1000
//! queue_capacity = 8
//! timeout_seconds = 30
//! window = 50000
//!
//! [[endpoints]]
//! name = "local"
//! url = "http://localhost:8545"
//!
//! [disabled_endpoints]
//! names = ["ankr"]
//! ```

use super::EndpointConfig;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk configuration; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub contract: Option<String>,
    pub topic: Option<String>,
    pub settings: Settings,
    /// Replaces the built-in endpoint list when non-empty
    pub endpoints: Vec<EndpointConfig>,
    pub disabled_endpoints: DisabledEndpoints,
}

/// `[settings]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Blocks per task
    pub batch_size: u64,
    /// Unset means twice the endpoint count
    pub queue_capacity: Option<usize>,
    pub timeout_seconds: u64,
    /// Blocks behind the head scanned when no start block is given
    pub window: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: super::DEFAULT_BATCH_SIZE,
            queue_capacity: None,
            timeout_seconds: super::DEFAULT_TIMEOUT_SECS,
            window: super::DEFAULT_WINDOW,
        }
    }
}

/// `[disabled_endpoints]` table, matched against endpoint names and URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisabledEndpoints {
    pub names: Vec<String>,
}

impl ConfigFile {
    /// `<config dir>/eth-log-scheduler/config.toml`
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("eth-log-scheduler").join("config.toml")
    }

    /// Read the file at [`default_path`](Self::default_path), if there is one
    pub fn load_default() -> Result<Option<Self>> {
        let path = Self::default_path();
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::file(path, e))?;
        Ok(toml::from_str(&text).map_err(ConfigError::from)?)
    }

    /// Write the file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::file(path, e))?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::file(path, e))?;
        }
        std::fs::write(path, text).map_err(|e| ConfigError::file(path, e))?;
        Ok(())
    }

    pub fn is_endpoint_disabled(&self, endpoint: &EndpointConfig) -> bool {
        self.disabled_endpoints
            .names
            .iter()
            .any(|n| *n == endpoint.name || *n == endpoint.url)
    }
}
