//! Pull-based worker bound to one endpoint
//!
//! ```text
//! loop {
//!   ├─► Idle:       pull next task        (queue closed + empty ─► exit)
//!   ├─► Backoff:    if failures > 0, sleep backoff.delay(failures)
//!   ├─► Processing: endpoint.fetch_logs(task range)
//!   │                 ├─ Ok  ─► failures = 0
//!   │                 └─ Err ─► failures += 1
//!   └─► emit exactly one TaskResult
//! }
//! ```
//!
//! Every suspension point also watches the cancellation token. A failed
//! task is reported and never requeued.

use super::{BackoffPolicy, Task, TaskResult};
use crate::rpc::{Endpoint, LogQuery};
use async_channel::Receiver;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Why a worker stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    /// Task queue closed and drained
    QueueDrained,
    /// Cancellation observed
    Cancelled,
    /// Nobody is collecting results any more
    ResultsClosed,
}

pub(crate) struct Worker {
    id: String,
    endpoint: Arc<dyn Endpoint>,
    query: LogQuery,
    backoff: BackoffPolicy,
    tasks: Receiver<Task>,
    results: mpsc::Sender<TaskResult>,
}

impl Worker {
    pub(crate) fn new(
        endpoint: Arc<dyn Endpoint>,
        query: LogQuery,
        backoff: BackoffPolicy,
        tasks: Receiver<Task>,
        results: mpsc::Sender<TaskResult>,
    ) -> Self {
        Self {
            id: endpoint.name().to_string(),
            endpoint,
            query,
            backoff,
            tasks,
            results,
        }
    }

    pub(crate) async fn run(self, cancel: CancellationToken) -> WorkerExit {
        let mut consecutive_failures: u32 = 0;

        loop {
            let task = tokio::select! {
                biased;
                _ = cancel.cancelled() => return WorkerExit::Cancelled,
                task = self.tasks.recv() => match task {
                    Ok(task) => task,
                    Err(_) => return WorkerExit::QueueDrained,
                },
            };

            if consecutive_failures > 0 {
                let delay = self.backoff.delay(consecutive_failures);
                tracing::info!(
                    "[{}] backing off for {:?} after {} failures",
                    self.id,
                    delay,
                    consecutive_failures
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return WorkerExit::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return WorkerExit::Cancelled,
                res = self.endpoint.fetch_logs(&self.query, task.from_block, task.to_block) => {
                    res.map(|logs| logs.len())
                }
            };

            match &outcome {
                Ok(count) => {
                    consecutive_failures = 0;
                    tracing::debug!(
                        "[{}] completed task {} (blocks {}-{}): {} logs",
                        self.id,
                        task.id,
                        task.from_block,
                        task.to_block,
                        count
                    );
                }
                Err(e) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    tracing::warn!("[{}] task {} failed: {}", self.id, task.id, e);
                }
            }

            let result = TaskResult {
                task,
                worker_id: self.id.clone(),
                outcome,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return WorkerExit::Cancelled,
                sent = self.results.send(result) => {
                    if sent.is_err() {
                        return WorkerExit::ResultsClosed;
                    }
                }
            }
        }
    }
}
