//! Units of work and their outcomes

use crate::error::RpcError;
use async_channel::Sender;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// An inclusive block range to fetch logs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Sequence number, starting at 0 for each run
    pub id: u64,
    pub from_block: u64,
    pub to_block: u64,
}

impl Task {
    /// Saturates for the full `0..=u64::MAX` range
    pub fn block_count(&self) -> u64 {
        (self.to_block - self.from_block).saturating_add(1)
    }
}

/// Outcome of processing exactly one [`Task`]
#[derive(Debug)]
pub struct TaskResult {
    pub task: Task,
    /// Name of the endpoint whose worker processed the task
    pub worker_id: String,
    /// Number of logs fetched, or the fetch error
    pub outcome: Result<usize, RpcError>,
}

impl TaskResult {
    /// Logs fetched; zero for a failed task
    pub fn log_count(&self) -> usize {
        *self.outcome.as_ref().unwrap_or(&0)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Number of tasks needed to cover `[start, end]` in batches of `batch_size`.
///
/// Returns 0 when `end < start`. `batch_size` must be non-zero. The one
/// count that does not fit, `[0, u64::MAX]` in single blocks, saturates to
/// `u64::MAX`.
pub fn count_tasks(start: u64, end: u64, batch_size: u64) -> u64 {
    if end < start {
        return 0;
    }
    ((end - start) / batch_size).saturating_add(1)
}

/// Iterator over the tasks partitioning `[start, end]`.
///
/// Ranges are contiguous, non-overlapping, at most `batch_size` blocks
/// each, and the last one ends exactly at `end`.
#[derive(Debug, Clone)]
pub struct TaskRanges {
    next_id: u64,
    next_from: u64,
    end: u64,
    batch_size: u64,
    done: bool,
}

impl TaskRanges {
    pub fn new(start: u64, end: u64, batch_size: u64) -> Self {
        Self {
            next_id: 0,
            next_from: start,
            end,
            batch_size,
            done: end < start || batch_size == 0,
        }
    }
}

impl Iterator for TaskRanges {
    type Item = Task;

    fn next(&mut self) -> Option<Task> {
        if self.done {
            return None;
        }

        let from = self.next_from;
        let to = from.saturating_add(self.batch_size - 1).min(self.end);
        let task = Task {
            id: self.next_id,
            from_block: from,
            to_block: to,
        };

        if to == self.end {
            self.done = true;
        } else {
            self.next_from = to + 1;
        }
        self.next_id += 1;

        Some(task)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = count_tasks(self.next_from, self.end, self.batch_size);
        match usize::try_from(remaining) {
            Ok(n) if remaining < u64::MAX => (n, Some(n)),
            _ => (usize::MAX, None),
        }
    }
}

/// Push every task into the queue, then close it.
///
/// Stops early when `cancel` fires or every reader is gone. Returns the
/// number of tasks enqueued.
pub(crate) async fn generate_tasks(
    ranges: TaskRanges,
    tasks: Sender<Task>,
    cancel: CancellationToken,
) -> u64 {
    let mut sent = 0;

    for task in ranges {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Task generation cancelled after {} tasks", sent);
                break;
            }
            res = tasks.send(task) => {
                if res.is_err() {
                    tracing::debug!("Task queue closed after {} tasks", sent);
                    break;
                }
                sent += 1;
            }
        }
    }

    tasks.close();
    sent
}
