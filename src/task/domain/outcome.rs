//! Backend handles and task results.

use super::TaskId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Handle returned by the backend for a submitted task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    task_id: TaskId,
}

impl TaskHandle {
    /// Creates a handle for the given task.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self { task_id }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }
}

/// Result stored by the backend for a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The task returned a value, or has not returned yet (`null`).
    Value(Value),
    /// The task raised an error with the given message.
    Error(String),
}

impl TaskOutcome {
    /// Returns the error message when the outcome is an error.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(Value::String(text)) | Self::Error(text) => f.write_str(text),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}
