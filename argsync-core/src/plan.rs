//! Plan - Queue of pending argument mutations
//!
//! A SyncPlan is an ordered list of Tasks to be dispatched. No side
//! effects occur until the plan is handed to the worker pool.

use crate::argument::{ArgumentPatch, ArgumentSpec, DeleteRef};
use crate::differ::ArgumentDiff;

/// One pending mutation against the remote argument collection.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Create(ArgumentSpec),
    Update(ArgumentPatch),
    Delete(DeleteRef),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Create(_) => TaskKind::Create,
            Task::Update(_) => TaskKind::Update,
            Task::Delete(_) => TaskKind::Delete,
        }
    }

    /// Key of the argument this task targets
    pub fn key(&self) -> &str {
        match self {
            Task::Create(spec) => &spec.key,
            Task::Update(patch) => &patch.key,
            Task::Delete(delete) => &delete.key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Create => write!(f, "create"),
            TaskKind::Update => write!(f, "update"),
            TaskKind::Delete => write!(f, "delete"),
        }
    }
}

/// Ordered queue of Tasks produced from an [`ArgumentDiff`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    tasks: Vec<Task>,
}

impl SyncPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue all of `diff`'s work: deletes first, then updates, then
    /// creates. Tasks in the queue target disjoint keys apart from
    /// recreated arguments, whose delete must complete before the create
    /// runs (see the reconciler's phase split).
    pub fn from_diff(diff: ArgumentDiff) -> Self {
        let mut plan = Self::new();
        for delete in diff.to_delete {
            plan.add(Task::Delete(delete));
        }
        for patch in diff.to_update {
            plan.add(Task::Update(patch));
        }
        for spec in diff.to_create {
            plan.add(Task::Create(spec));
        }
        plan
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Generate a summary of the plan for display
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for task in &self.tasks {
            match task {
                Task::Create(_) => summary.create += 1,
                Task::Update(_) => summary.update += 1,
                Task::Delete(_) => summary.delete += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plan: {} to create, {} to update, {} to delete",
            self.create, self.update, self.delete
        )
    }
}
