//! Error types for the Scalr client

use argsync_core::reconciler::SyncError;
use argsync_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScalrError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The API rejected the request for any other reason
    #[error("Scalr API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Argument creation failed after the provider configuration was
    /// created; the configuration was deleted again.
    #[error("argument sync failed ({source}); provider configuration '{id}' was rolled back")]
    RolledBack { id: String, source: SyncError },

    /// Argument creation failed and the compensating delete of the parent
    /// configuration failed too, leaving it behind without its arguments.
    #[error(
        "argument sync failed ({source}); cleanup of provider configuration '{id}' also failed: {cleanup}"
    )]
    RollbackFailed {
        id: String,
        source: SyncError,
        cleanup: Box<ScalrError>,
    },
}

impl From<ScalrError> for StoreError {
    fn from(err: ScalrError) -> Self {
        match err {
            ScalrError::NotFound(message) => StoreError::NotFound(message),
            ScalrError::Auth(message) => StoreError::Auth(message),
            other => StoreError::Remote(other.to_string()),
        }
    }
}
