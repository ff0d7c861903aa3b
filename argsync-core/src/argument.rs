//! Argument - Representing provider configuration arguments and their state

use std::collections::HashMap;

/// An argument as it exists on the remote system.
///
/// Identity for diffing purposes is `key`; the server-assigned `id` is only
/// needed to address updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Server-assigned identifier
    pub id: String,
    /// Argument key, unique within the parent provider configuration
    pub key: String,
    /// Argument value; the remote never returns values of sensitive arguments
    pub value: Option<String>,
    pub sensitive: bool,
    pub description: Option<String>,
}

/// Desired state of a single argument, declared by the caller.
///
/// Has no `id`: the argument may not exist remotely yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub key: String,
    pub value: Option<String>,
    pub sensitive: bool,
    pub description: Option<String>,
}

impl ArgumentSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Replacement fields for an existing argument.
///
/// Carries the target `id` and the `key` it belongs to; the key is not sent
/// to the remote but kept for error context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentPatch {
    pub id: String,
    pub key: String,
    pub value: Option<String>,
    pub sensitive: bool,
    pub description: Option<String>,
}

impl ArgumentPatch {
    /// Build a patch replacing `current`'s fields with `desired`'s.
    pub fn replacing(current: &Argument, desired: &ArgumentSpec) -> Self {
        Self {
            id: current.id.clone(),
            key: current.key.clone(),
            value: desired.value.clone(),
            sensitive: desired.sensitive,
            description: desired.description.clone(),
        }
    }
}

/// Reference to an argument scheduled for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRef {
    pub id: String,
    pub key: String,
}

impl DeleteRef {
    pub fn of(argument: &Argument) -> Self {
        Self {
            id: argument.id.clone(),
            key: argument.key.clone(),
        }
    }
}

/// Desired arguments keyed by argument key
pub type DesiredSet = HashMap<String, ArgumentSpec>;

/// Remote arguments keyed by argument key, as last read from the server
pub type CurrentSet = HashMap<String, Argument>;

/// Build a [`DesiredSet`] from specs. A later spec with the same key wins.
pub fn desired_set(specs: impl IntoIterator<Item = ArgumentSpec>) -> DesiredSet {
    specs.into_iter().map(|s| (s.key.clone(), s)).collect()
}

/// Build a [`CurrentSet`] from arguments read from the remote.
pub fn current_set(arguments: impl IntoIterator<Item = Argument>) -> CurrentSet {
    arguments.into_iter().map(|a| (a.key.clone(), a)).collect()
}
