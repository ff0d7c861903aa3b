//! Differ - Compare desired arguments with current remote state
//!
//! Compares the desired argument set with the current set read from the
//! remote and partitions the keys into create/update/delete work. Pure
//! computation; nothing here talks to the network.

use crate::argument::{Argument, ArgumentPatch, ArgumentSpec, CurrentSet, DeleteRef, DesiredSet};

/// Result of diffing one desired/current pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    /// Key absent remotely -> needs creation
    Create(ArgumentSpec),
    /// Key exists with differing fields -> needs update in place
    Update(ArgumentPatch),
    /// Key exists as sensitive but is no longer desired sensitive.
    /// The remote never reveals a sensitive value, so the argument cannot
    /// be downgraded in place and must be deleted and created again.
    Recreate {
        delete: DeleteRef,
        create: ArgumentSpec,
    },
    /// Key exists with identical fields -> no action needed
    NoChange,
}

impl Diff {
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange)
    }
}

/// Compare one desired argument with its current remote state, if any.
pub fn diff(desired: &ArgumentSpec, current: Option<&Argument>) -> Diff {
    let Some(current) = current else {
        return Diff::Create(desired.clone());
    };

    if current.sensitive && !desired.sensitive {
        return Diff::Recreate {
            delete: DeleteRef::of(current),
            create: desired.clone(),
        };
    }

    if current.value == desired.value
        && current.sensitive == desired.sensitive
        && current.description == desired.description
    {
        Diff::NoChange
    } else {
        Diff::Update(ArgumentPatch::replacing(current, desired))
    }
}

/// The three mutation categories produced by [`diff_arguments`].
///
/// Ordering within each list follows map iteration and is unspecified.
/// Create and delete keys only intersect for recreated arguments; update
/// keys are disjoint from both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentDiff {
    pub to_create: Vec<ArgumentSpec>,
    pub to_update: Vec<ArgumentPatch>,
    pub to_delete: Vec<DeleteRef>,
}

impl ArgumentDiff {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Total number of pending mutations
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Partition `keys(desired) ∪ keys(current)` into create/update/delete work.
///
/// Both sets are treated as immutable snapshots. A key present identically
/// in both produces no work (re-running a successful reconciliation yields
/// an empty diff).
pub fn diff_arguments(desired: &DesiredSet, current: &CurrentSet) -> ArgumentDiff {
    let mut result = ArgumentDiff::default();

    for (key, spec) in desired {
        match diff(spec, current.get(key)) {
            Diff::Create(spec) => result.to_create.push(spec),
            Diff::Update(patch) => result.to_update.push(patch),
            Diff::Recreate { delete, create } => {
                result.to_delete.push(delete);
                result.to_create.push(create);
            }
            Diff::NoChange => {}
        }
    }

    for (key, argument) in current {
        if !desired.contains_key(key) {
            result.to_delete.push(DeleteRef::of(argument));
        }
    }

    result
}
