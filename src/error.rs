//! Domain error types.

use thiserror::Error;

/// Errors produced by the task service and its stores.
///
/// Validation and conflict are detected before any store mutation;
/// upstream wraps store failures and propagates to the caller.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl TaskError {
    /// Convenience for the common "task {id} not found" case.
    pub fn task_not_found(id: uuid::Uuid) -> Self {
        TaskError::NotFound(format!("task {} not found", id))
    }
}

/// Errors produced by the account store.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("account already exists: {0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account store failure: {0}")]
    Upstream(String),
}
