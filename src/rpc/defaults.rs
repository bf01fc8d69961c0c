//! Default public Sepolia RPC endpoints

use crate::config::EndpointConfig;

/// Get the default endpoint set
pub fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("publicnode", "https://ethereum-sepolia-rpc.publicnode.com")
            .with_note("No key required"),
        EndpointConfig::new("ankr", "https://rpc.ankr.com/eth_sepolia"),
        EndpointConfig::new("drpc", "https://sepolia.drpc.org"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_endpoints() {
        let endpoints = default_endpoints();
        assert_eq!(endpoints.len(), 3);
        assert!(endpoints.iter().all(|e| e.enabled && e.url.starts_with("https://")));

        // Names identify workers, so they must be unique
        let names: HashSet<_> = endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), endpoints.len());
    }
}
