//! Per-endpoint request statistics

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Request counters for one endpoint.
///
/// Written only by the worker bound to the endpoint, but read concurrently
/// by reporting code, so every counter is atomic.
#[derive(Debug)]
pub struct EndpointStats {
    name: String,
    total_requests: AtomicU64,
    failures: AtomicU64,
    total_latency_nanos: AtomicU64,
}

/// Point-in-time copy of [`EndpointStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Endpoint name
    pub name: String,
    /// Number of log requests issued
    pub total_requests: u64,
    /// Number of requests that returned an error
    pub failures: u64,
    /// Mean request latency (zero when no requests were made)
    #[serde(serialize_with = "serialize_millis")]
    pub average_latency: Duration,
}

impl EndpointStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            total_latency_nanos: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record one completed request
    pub fn record(&self, latency: Duration, success: bool) {
        let nanos = u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX);
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_nanos.fetch_add(nanos, Ordering::Relaxed);
        if !success {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn average_latency(&self) -> Duration {
        let requests = self.total_requests();
        if requests == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.total_latency_nanos.load(Ordering::Relaxed) / requests)
    }

    /// Take a snapshot without blocking the writer
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            name: self.name.clone(),
            total_requests: self.total_requests(),
            failures: self.failures(),
            average_latency: self.average_latency(),
        }
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}
