//! Reconciler - Drive a full argument sync against a store
//!
//! Computes the diff between desired and current arguments and dispatches
//! it through the worker pool. Deletes are dispatched as a first phase and
//! run to completion before updates and creates, so a recreated argument
//! (sensitive downgrade) never races its own deletion. Within each phase
//! task keys are disjoint and ordering is irrelevant.

use std::sync::Arc;

use thiserror::Error;

use crate::argument::{CurrentSet, DesiredSet, current_set};
use crate::differ::diff_arguments;
use crate::plan::{SyncPlan, Task};
use crate::pool::{Dispatcher, SyncOutcome, TaskError};
use crate::store::{ParameterStore, StoreError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// Reading the current argument set failed before any mutation ran
    #[error("failed to list arguments of provider configuration '{config_id}': {source}")]
    List {
        config_id: String,
        source: StoreError,
    },

    /// A mutation failed. The remote may be partially synced; re-running
    /// the reconciliation converges.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Reconciles the argument collection of one provider configuration
pub struct Reconciler<S: ?Sized> {
    store: Arc<S>,
    dispatcher: Dispatcher,
}

impl<S> Reconciler<S>
where
    S: ParameterStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            dispatcher: Dispatcher::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.dispatcher = Dispatcher::new(workers);
        self
    }

    /// Read the current argument set from the store, then reconcile.
    pub async fn sync(
        &self,
        config_id: &str,
        desired: &DesiredSet,
    ) -> Result<SyncOutcome, SyncError> {
        let arguments =
            self.store
                .list_parameters(config_id)
                .await
                .map_err(|source| SyncError::List {
                    config_id: config_id.to_string(),
                    source,
                })?;

        self.reconcile(config_id, desired, &current_set(arguments))
            .await
    }

    /// Apply the minimal set of mutations making `current` match `desired`.
    ///
    /// Both sets are read-only snapshots; the remote is the sole source of
    /// truth between invocations. On error the remote side effects of
    /// completed tasks remain in place.
    pub async fn reconcile(
        &self,
        config_id: &str,
        desired: &DesiredSet,
        current: &CurrentSet,
    ) -> Result<SyncOutcome, SyncError> {
        let diff = diff_arguments(desired, current);

        let mut deletions = SyncPlan::new();
        for delete in diff.to_delete {
            deletions.add(Task::Delete(delete));
        }

        let mut mutations = SyncPlan::new();
        for patch in diff.to_update {
            mutations.add(Task::Update(patch));
        }
        for spec in diff.to_create {
            mutations.add(Task::Create(spec));
        }

        let deleted = self
            .dispatcher
            .run(Arc::clone(&self.store), config_id, deletions)
            .await?;
        let changed = self
            .dispatcher
            .run(Arc::clone(&self.store), config_id, mutations)
            .await?;

        Ok(deleted.merge(changed))
    }
}
