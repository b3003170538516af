//! Task backend port: submission, state queries and result storage.

use crate::task::domain::{TaskHandle, TaskId, TaskOutcome};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task backend operations.
pub type TaskBackendResult<T> = Result<T, TaskBackendError>;

/// Job handed to the backend for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSubmission {
    /// Identifier the backend must use for the job.
    pub task_id: TaskId,
    /// Registered job name.
    pub task_name: String,
    /// JSON-encoded job arguments.
    pub args: Value,
}

impl TaskSubmission {
    /// Creates a submission payload.
    #[must_use]
    pub fn new(task_id: TaskId, task_name: impl Into<String>, args: Value) -> Self {
        Self {
            task_id,
            task_name: task_name.into(),
            args,
        }
    }
}

/// Contract of the external task-execution backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Returns the raw backend state name of a task.
    async fn state(&self, task_id: &TaskId) -> TaskBackendResult<String>;

    /// Returns `true` when the backend holds a terminal result for the task.
    async fn is_ready(&self, task_id: &TaskId) -> TaskBackendResult<bool>;

    /// Returns the stored result of a task.
    async fn result(&self, task_id: &TaskId) -> TaskBackendResult<TaskOutcome>;

    /// Discards the stored result of a task.
    async fn forget(&self, task_id: &TaskId) -> TaskBackendResult<()>;

    /// Enqueues a job under the submission's task identifier.
    async fn submit(&self, submission: &TaskSubmission) -> TaskBackendResult<TaskHandle>;
}

/// Errors returned by task backend adapters.
#[derive(Debug, Clone, Error)]
pub enum TaskBackendError {
    /// The backend could not be reached.
    #[error("task backend unavailable: {0}")]
    Unavailable(String),

    /// The backend does not know the task.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    /// The backend holds an unreadable record for the task.
    #[error("corrupted backend record for task {task_id}: {reason}")]
    Corrupted {
        /// Task identifier.
        task_id: TaskId,
        /// Reason string.
        reason: String,
    },

    /// Generic backend failure.
    #[error("task backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskBackendError {
    /// Wraps an error raised by the backend client.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
