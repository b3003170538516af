//! Service-level error types for task tracking.

use crate::task::{
    domain::{OwnerRef, TaskId},
    ports::{TaskBackendError, TaskRepositoryError},
};
use thiserror::Error;

/// Service-level errors for task tracking operations.
#[derive(Debug, Error)]
pub enum TaskTrackingError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Task backend operation failed.
    #[error(transparent)]
    Backend(#[from] TaskBackendError),
    /// The owner has no task with the given identifier.
    #[error("task {task_id} not found for {owner}")]
    NotFound {
        /// Owner the lookup was scoped to.
        owner: OwnerRef,
        /// Requested task identifier.
        task_id: TaskId,
    },
}

/// Result type for task tracking service operations.
pub type TaskTrackingResult<T> = Result<T, TaskTrackingError>;
