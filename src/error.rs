//! Error types
//!
//! Per-task fetch failures are [`RpcError`]s carried inside task results and
//! never abort a run. Setup problems surface as [`ConfigError`] before any
//! worker starts. A run that stops early returns a [`SchedulerError`] holding
//! whatever was aggregated up to that point.

use crate::scheduler::RunReport;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("rpc: {0}")]
    Rpc(#[from] RpcError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("scheduler: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to a single endpoint
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("none of the configured endpoints could be set up")]
    NoUsableEndpoints,

    #[error("no endpoint reported a head block")]
    HeadUnavailable,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("{0} is rate limiting requests")]
    RateLimited(String),

    #[error("bad endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("node returned an error: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot use config file {}: {reason}", .path.display())]
    File { path: PathBuf, reason: String },

    #[error("malformed config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid contract address: {0}")]
    InvalidAddress(String),

    #[error("invalid event topic: {0}")]
    InvalidTopic(String),

    #[error("invalid block number: {0}")]
    InvalidBlockNumber(String),

    #[error("batch size must be at least one block")]
    ZeroBatchSize,

    #[error("task queue capacity must be at least one")]
    ZeroQueueCapacity,

    #[error("no enabled RPC endpoints")]
    NoEndpoints,

    #[error("endpoint name {0:?} is used more than once")]
    DuplicateEndpoint(String),
}

impl ConfigError {
    pub(crate) fn file(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConfigError::File {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Terminal errors of a scheduler run.
///
/// Both variants carry the partial aggregate collected before the run
/// stopped; callers must treat it as incomplete.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("run cancelled after {}/{} tasks", .0.completed, .0.total_tasks)]
    Cancelled(Box<RunReport>),

    #[error("result stream closed after {}/{} tasks", .0.completed, .0.total_tasks)]
    Incomplete(Box<RunReport>),
}

impl SchedulerError {
    /// The aggregate collected before the run stopped
    pub fn partial(&self) -> &RunReport {
        match self {
            SchedulerError::Cancelled(report) | SchedulerError::Incomplete(report) => report,
        }
    }

    /// Consume the error, keeping the partial aggregate
    pub fn into_partial(self) -> RunReport {
        match self {
            SchedulerError::Cancelled(report) | SchedulerError::Incomplete(report) => *report,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SchedulerError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_report_survives_error() {
        let report = RunReport {
            total_tasks: 10,
            completed: 4,
            total_logs: 12,
            ..Default::default()
        };
        let err = SchedulerError::Cancelled(Box::new(report));

        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "run cancelled after 4/10 tasks");
        assert_eq!(err.partial().total_logs, 12);
        assert_eq!(err.into_partial().completed, 4);
    }

    #[test]
    fn test_config_file_error_names_path() {
        let err = ConfigError::file("/tmp/x.toml", "permission denied");
        assert_eq!(
            err.to_string(),
            "cannot use config file /tmp/x.toml: permission denied"
        );
    }
}
