//! Task distribution across endpoints
//!
//! ```text
//!                 ┌─────────────┐
//!                 │  generator  │  TaskRanges ─► bounded task queue
//!                 └──────┬──────┘
//!                        ▼
//!        ┌───────────────┼───────────────┐
//!        ▼               ▼               ▼
//!   ┌─────────┐     ┌─────────┐     ┌─────────┐
//!   │ worker  │     │ worker  │     │ worker  │   one per endpoint,
//!   │ (ep. 1) │     │ (ep. 2) │     │ (ep. N) │   pull when idle
//!   └────┬────┘     └────┬────┘     └────┬────┘
//!        └───────────────┼───────────────┘
//!                        ▼
//!                bounded result queue ─► collector (caller's task)
//! ```
//!
//! Faster endpoints finish sooner and therefore pull more tasks. A failed
//! task is reported once and not retried; the collector counts it towards
//! completion and leaves it out of the log total.

mod backoff;
mod task;
mod worker;

pub use backoff::BackoffPolicy;
pub use task::{count_tasks, Task, TaskRanges, TaskResult};

use crate::config::{first_duplicate, DEFAULT_BATCH_SIZE};
use crate::error::{ConfigError, Result, SchedulerError};
use crate::rpc::{Endpoint, LogQuery, RpcPool, StatsSnapshot};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use task::generate_tasks;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use worker::Worker;

/// Scheduler settings; `None` selects the default
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerConfig {
    /// Blocks per task (default 1000)
    pub batch_size: Option<u64>,
    /// Task and result queue capacity (default twice the endpoint count)
    pub queue_capacity: Option<usize>,
    /// Per-worker delay schedule after failures
    pub backoff: BackoffPolicy,
}

/// Aggregate outcome of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub start_block: u64,
    pub end_block: u64,
    /// Tasks needed to cover the range
    pub total_tasks: u64,
    /// Results received, successful or not
    pub completed: u64,
    /// Results carrying an error
    pub failed: u64,
    /// Logs across successful results
    pub total_logs: u64,
    /// Results received per worker
    pub tasks_by_worker: BTreeMap<String, u64>,
    /// Endpoint statistics at the end of the run
    pub endpoint_stats: Vec<StatsSnapshot>,
}

impl RunReport {
    fn new(start_block: u64, end_block: u64, total_tasks: u64) -> Self {
        Self {
            start_block,
            end_block,
            total_tasks,
            ..Default::default()
        }
    }

    fn record(&mut self, result: &TaskResult) {
        self.completed += 1;
        if result.is_success() {
            self.total_logs += result.log_count() as u64;
        } else {
            self.failed += 1;
        }
        *self
            .tasks_by_worker
            .entry(result.worker_id.clone())
            .or_default() += 1;
    }

    /// Successful results
    pub fn succeeded(&self) -> u64 {
        self.completed - self.failed
    }

    /// Whether every task produced a result
    pub fn is_complete(&self) -> bool {
        self.completed == self.total_tasks
    }

    /// Blocks in the requested range
    pub fn block_count(&self) -> u64 {
        if self.end_block < self.start_block {
            0
        } else {
            (self.end_block - self.start_block).saturating_add(1)
        }
    }

    fn progress(&self, last: &Task) -> RunProgress {
        RunProgress {
            completed: self.completed,
            total_tasks: self.total_tasks,
            failed: self.failed,
            total_logs: self.total_logs,
            last_task: *last,
            percent: if self.total_tasks == 0 {
                100.0
            } else {
                self.completed as f64 / self.total_tasks as f64 * 100.0
            },
        }
    }
}

/// Collector progress, reported after every result
#[derive(Debug, Clone)]
pub struct RunProgress {
    pub completed: u64,
    pub total_tasks: u64,
    pub failed: u64,
    pub total_logs: u64,
    /// Task whose result was just received
    pub last_task: Task,
    /// Percentage of tasks with a result
    pub percent: f64,
}

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(RunProgress) + Send + Sync>;

enum CollectOutcome {
    Complete,
    Cancelled,
    Closed,
}

/// Distributes block-range tasks over a fixed set of endpoints
pub struct Scheduler {
    endpoints: Vec<Arc<dyn Endpoint>>,
    query: LogQuery,
    batch_size: u64,
    queue_capacity: usize,
    backoff: BackoffPolicy,
    progress_callback: Option<ProgressCallback>,
}

impl Scheduler {
    /// Create a scheduler, applying defaults and rejecting invalid settings
    pub fn new(
        endpoints: Vec<Arc<dyn Endpoint>>,
        query: LogQuery,
        config: SchedulerConfig,
    ) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints.into());
        }
        // Names key the per-worker counts and the stats report
        if let Some(name) = first_duplicate(endpoints.iter().map(|e| e.name())) {
            return Err(ConfigError::DuplicateEndpoint(name).into());
        }

        let batch_size = match config.batch_size {
            Some(0) => return Err(ConfigError::ZeroBatchSize.into()),
            Some(n) => n,
            None => DEFAULT_BATCH_SIZE,
        };
        let queue_capacity = match config.queue_capacity {
            Some(0) => return Err(ConfigError::ZeroQueueCapacity.into()),
            Some(n) => n,
            None => endpoints.len() * 2,
        };

        Ok(Self {
            endpoints,
            query,
            batch_size,
            queue_capacity,
            backoff: config.backoff,
            progress_callback: None,
        })
    }

    /// Create a scheduler over every endpoint in a pool
    pub fn from_pool(pool: &RpcPool, query: LogQuery, config: SchedulerConfig) -> Result<Self> {
        Self::new(pool.endpoints().to_vec(), query, config)
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(RunProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Number of tasks a run over `[start_block, end_block]` produces
    pub fn count_tasks(&self, start_block: u64, end_block: u64) -> u64 {
        count_tasks(start_block, end_block, self.batch_size)
    }

    /// Current statistics for every endpoint
    pub fn endpoint_stats(&self) -> Vec<StatsSnapshot> {
        self.endpoints.iter().map(|e| e.stats().snapshot()).collect()
    }

    /// Fetch logs for `[start_block, end_block]` and aggregate the counts.
    ///
    /// Returns once every task has produced a result. Failed tasks are
    /// counted in the report, not returned as errors. On cancellation the
    /// error carries the partial report. All spawned workers are joined
    /// before this returns.
    pub async fn run(
        &self,
        start_block: u64,
        end_block: u64,
        cancel: &CancellationToken,
    ) -> std::result::Result<RunReport, SchedulerError> {
        let run_token = cancel.child_token();
        let (task_tx, task_rx) = async_channel::bounded(self.queue_capacity);
        let (result_tx, mut result_rx) = mpsc::channel(self.queue_capacity);

        let workers: Vec<_> = self
            .endpoints
            .iter()
            .map(|endpoint| {
                let worker = Worker::new(
                    endpoint.clone(),
                    self.query,
                    self.backoff,
                    task_rx.clone(),
                    result_tx.clone(),
                );
                tokio::spawn(worker.run(run_token.clone()))
            })
            .collect();
        // Workers hold the only receivers and senders from here on
        drop(task_rx);
        drop(result_tx);

        let generator = tokio::spawn(generate_tasks(
            TaskRanges::new(start_block, end_block, self.batch_size),
            task_tx,
            run_token.clone(),
        ));

        let total_tasks = self.count_tasks(start_block, end_block);
        tracing::info!(
            "Scheduling {} tasks over blocks {}-{} across {} endpoints",
            total_tasks,
            start_block,
            end_block,
            self.endpoints.len()
        );

        let mut report = RunReport::new(start_block, end_block, total_tasks);
        let outcome = self
            .collect_results(&mut result_rx, &mut report, &run_token)
            .await;
        if !matches!(outcome, CollectOutcome::Complete) {
            run_token.cancel();
        }

        let exits = join_all(workers).await;
        for (endpoint, exit) in self.endpoints.iter().zip(exits) {
            match exit {
                Ok(exit) => tracing::debug!("[{}] worker stopped: {:?}", endpoint.name(), exit),
                Err(e) => tracing::warn!("[{}] worker panicked: {}", endpoint.name(), e),
            }
        }
        match generator.await {
            Ok(sent) => tracing::debug!("Generated {} of {} tasks", sent, total_tasks),
            Err(e) => tracing::warn!("Task generator panicked: {}", e),
        }

        report.endpoint_stats = self.endpoint_stats();
        log_stats(&report.endpoint_stats);

        match outcome {
            CollectOutcome::Complete => Ok(report),
            CollectOutcome::Cancelled => Err(SchedulerError::Cancelled(Box::new(report))),
            CollectOutcome::Closed => Err(SchedulerError::Incomplete(Box::new(report))),
        }
    }

    /// Drain results until every task is accounted for or the run stops
    async fn collect_results(
        &self,
        results: &mut mpsc::Receiver<TaskResult>,
        report: &mut RunReport,
        cancel: &CancellationToken,
    ) -> CollectOutcome {
        while report.completed < report.total_tasks {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return CollectOutcome::Cancelled,
                result = results.recv() => {
                    let Some(result) = result else {
                        return CollectOutcome::Closed;
                    };

                    if let Err(e) = &result.outcome {
                        tracing::warn!(
                            "Task {} (blocks {}-{}) failed on {}: {}",
                            result.task.id,
                            result.task.from_block,
                            result.task.to_block,
                            result.worker_id,
                            e
                        );
                    }
                    report.record(&result);

                    if let Some(cb) = &self.progress_callback {
                        cb(report.progress(&result.task));
                    }
                }
            }
        }

        CollectOutcome::Complete
    }
}

fn log_stats(stats: &[StatsSnapshot]) {
    tracing::info!("=== RPC Statistics ===");
    for s in stats {
        tracing::info!(
            "[{}] requests={} failures={} avg_latency={:?}",
            s.name,
            s.total_requests,
            s.failures,
            s.average_latency
        );
    }
}
