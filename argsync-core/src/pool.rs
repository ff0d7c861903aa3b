//! Pool - Bounded-concurrency task dispatcher
//!
//! Executes a SyncPlan against a ParameterStore with a fixed number of
//! workers. A single producer pre-fills a shared queue, each worker pulls
//! tasks and performs one remote call at a time, and an aggregator drains
//! one result per dispatched task. The first error wins; tasks already in
//! the queue still run to completion and their remote effects are not
//! rolled back, so a failed dispatch can leave the remote partially
//! synced. Re-running the reconciliation converges.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

use crate::argument::Argument;
use crate::plan::{SyncPlan, Task, TaskKind};
use crate::store::{ParameterStore, StoreError};

/// Default number of concurrent workers. Bounds outbound request
/// concurrency against the remote API; tasks are I/O-bound.
pub const NUM_PARALLEL: usize = 10;

/// A task's remote call failed. Carries enough context for the caller to
/// log and decide whether to re-run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to {kind} argument '{key}': {source}")]
pub struct TaskError {
    pub kind: TaskKind,
    pub key: String,
    pub source: StoreError,
}

/// Accumulated results of a successful dispatch
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub created: Vec<Argument>,
    pub updated: Vec<Argument>,
    /// Server-assigned ids of deleted arguments
    pub deleted: Vec<String>,
}

impl SyncOutcome {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Fold another outcome into this one
    pub fn merge(mut self, other: SyncOutcome) -> Self {
        self.created.extend(other.created);
        self.updated.extend(other.updated);
        self.deleted.extend(other.deleted);
        self
    }
}

/// Per-task result emitted by workers
#[derive(Debug)]
enum TaskOutcome {
    Created(Argument),
    Updated(Argument),
    Deleted(String),
}

/// Fixed-size worker pool dispatching tasks against a store
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    workers: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(NUM_PARALLEL)
    }
}

impl Dispatcher {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Execute every task in `plan`, returning the aggregated outcome or
    /// the first error observed. Ordering across tasks is not guaranteed.
    pub async fn run<S>(
        &self,
        store: Arc<S>,
        config_id: &str,
        plan: SyncPlan,
    ) -> Result<SyncOutcome, TaskError>
    where
        S: ParameterStore + ?Sized + 'static,
    {
        let total = plan.len();
        if total == 0 {
            return Ok(SyncOutcome::default());
        }

        let (task_tx, task_rx) = mpsc::unbounded_channel::<Task>();
        for task in plan.into_tasks() {
            // Receiver is alive, send cannot fail
            let _ = task_tx.send(task);
        }
        drop(task_tx);

        // The queue is pre-filled and closed, so holding the lock across
        // recv() never blocks a worker behind another worker's network call.
        let queue = Arc::new(Mutex::new(task_rx));
        let (result_tx, mut result_rx) =
            mpsc::unbounded_channel::<Result<TaskOutcome, TaskError>>();

        for _ in 0..self.workers.min(total) {
            let store = Arc::clone(&store);
            let queue = Arc::clone(&queue);
            let result_tx = result_tx.clone();
            let config_id = config_id.to_string();

            tokio::spawn(async move {
                loop {
                    let task = {
                        let mut queue = queue.lock().await;
                        queue.recv().await
                    };
                    let Some(task) = task else { break };

                    let result = execute_task(store.as_ref(), &config_id, task).await;
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        // Drain exactly one result per task so that in-flight workers are
        // never blocked; results after the first error are discarded.
        let mut outcome = SyncOutcome::default();
        let mut first_error: Option<TaskError> = None;
        let mut received = 0;

        while received < total {
            let Some(result) = result_rx.recv().await else {
                break;
            };
            received += 1;

            match result {
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
                Ok(_) if first_error.is_some() => {}
                Ok(TaskOutcome::Created(argument)) => outcome.created.push(argument),
                Ok(TaskOutcome::Updated(argument)) => outcome.updated.push(argument),
                Ok(TaskOutcome::Deleted(id)) => outcome.deleted.push(id),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(outcome),
        }
    }
}

async fn execute_task<S>(
    store: &S,
    config_id: &str,
    task: Task,
) -> Result<TaskOutcome, TaskError>
where
    S: ParameterStore + ?Sized,
{
    let kind = task.kind();
    let key = task.key().to_string();

    let result = match task {
        Task::Create(spec) => store
            .create_parameter(config_id, &spec)
            .await
            .map(TaskOutcome::Created),
        Task::Update(patch) => store
            .update_parameter(&patch)
            .await
            .map(TaskOutcome::Updated),
        Task::Delete(delete) => store
            .delete_parameter(&delete.id)
            .await
            .map(|_| TaskOutcome::Deleted(delete.id)),
    };

    result.map_err(|source| TaskError { kind, key, source })
}
