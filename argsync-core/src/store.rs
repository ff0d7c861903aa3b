//! Store - Trait abstracting the remote argument API
//!
//! A ParameterStore defines the mutation operations the worker pool
//! performs against the remote system. It is implemented by the Scalr
//! REST client and by in-memory fakes in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::argument::{Argument, ArgumentPatch, ArgumentSpec};

/// Errors surfaced by a [`ParameterStore`] implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The target resource no longer exists remotely
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote rejected our credentials
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Any other remote failure (validation, network, server error)
    #[error("remote call failed: {0}")]
    Remote(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote mutation operations for provider configuration arguments.
///
/// Every call is one blocking network round trip. The reconciler treats
/// all errors uniformly; distinguishing [`StoreError::NotFound`] is the
/// caller's concern.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read all arguments of a provider configuration
    async fn list_parameters(&self, config_id: &str) -> StoreResult<Vec<Argument>>;

    /// Create an argument, returning it with its server-assigned id
    async fn create_parameter(
        &self,
        config_id: &str,
        spec: &ArgumentSpec,
    ) -> StoreResult<Argument>;

    /// Replace an existing argument's fields
    async fn update_parameter(&self, patch: &ArgumentPatch) -> StoreResult<Argument>;

    /// Delete an argument by its server-assigned id
    async fn delete_parameter(&self, id: &str) -> StoreResult<()>;
}
