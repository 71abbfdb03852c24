//! Error types for the to-do core.
//!
//! Only [`AppError`] ever reaches callers. Remote and sign-in errors are
//! consumed inside effects: a failed sign-in becomes a state transition,
//! failed writes and subscription errors are logged and dropped.

use crate::types::ItemId;
use thiserror::Error;
use todosync_runtime::StoreError;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors returned by a remote collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The backend could not be reached.
    #[error("Remote collection unavailable: {0}")]
    Unavailable(String),

    /// No document with this id exists in the collection.
    #[error("Document {0} not found")]
    NotFound(ItemId),

    /// The backend refused the operation.
    #[error("Remote operation rejected: {0}")]
    Rejected(String),
}

/// Errors ending an external sign-in flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignInError {
    /// The user backed out of the flow.
    #[error("Sign-in cancelled")]
    Cancelled,

    /// The provider reported a failure.
    #[error("Sign-in failed: {0}")]
    Failed(String),
}

/// Errors surfaced by [`TodoApp`](crate::TodoApp).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The store rejected or timed out an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Sign-in did not complete; the application has terminated.
    #[error("Application terminated: sign-in did not complete")]
    Terminated,

    /// The awaited state was not reached in time.
    #[error("Timed out waiting for application state")]
    Timeout,
}

impl AppError {
    /// Folds a store timeout into [`AppError::Timeout`].
    pub(crate) fn from_wait(error: StoreError) -> Self {
        match error {
            StoreError::Timeout => Self::Timeout,
            other => Self::Store(other),
        }
    }
}
