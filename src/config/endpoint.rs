//! RPC endpoint configuration

use serde::{Deserialize, Serialize};

/// Configuration for a single RPC endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Short identifier, used as the worker id and in statistics
    pub name: String,
    /// RPC URL
    pub url: String,
    /// Optional note about the endpoint
    #[serde(default)]
    pub note: Option<String>,
    /// Whether this endpoint is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl EndpointConfig {
    /// Create a new endpoint config with defaults
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            note: None,
            enabled: true,
        }
    }

    /// Create a config from a bare URL, naming it after the host
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::new(host_name(&url), url)
    }

    /// Parse `name=url`, or a bare URL
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('=') {
            Some((name, url)) if !name.is_empty() && !name.contains('/') => {
                Self::new(name.trim(), url.trim())
            }
            _ => Self::from_url(spec.trim()),
        }
    }

    /// Builder-style setter for note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builder-style setter for enabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

fn host_name(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', ':', '?'])
        .next()
        .filter(|h| !h.is_empty())
        .unwrap_or(url)
        .to_string()
}
