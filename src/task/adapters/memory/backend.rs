//! In-memory task backend adapter.

use crate::task::{
    domain::{TaskHandle, TaskId, TaskOutcome},
    ports::{TaskBackend, TaskBackendError, TaskBackendResult, TaskSubmission},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Backend state names that carry a terminal result.
const READY_STATES: [&str; 3] = ["SUCCESS", "FAILURE", "REVOKED"];

/// State reported for identifiers the backend has never seen.
const UNKNOWN_TASK_STATE: &str = "PENDING";

/// In-memory task backend adapter.
///
/// This adapter models a result backend without executing jobs: tests and
/// local flows program task states and outcomes directly. Like real result
/// backends it reports unknown task identifiers as pending.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskBackend {
    state: Arc<RwLock<InMemoryBackendState>>,
}

#[derive(Debug, Default)]
struct InMemoryBackendState {
    tasks: HashMap<TaskId, BackendTask>,
    broken_states: HashMap<TaskId, String>,
    broken_results: HashMap<TaskId, String>,
    submissions: Vec<TaskSubmission>,
    forgotten: Vec<TaskId>,
}

#[derive(Debug, Clone)]
struct BackendTask {
    state: String,
    outcome: Option<TaskOutcome>,
}

impl InMemoryTaskBackend {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskBackendResult<RwLockReadGuard<'_, InMemoryBackendState>> {
        self.state
            .read()
            .map_err(|err| TaskBackendError::backend(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> TaskBackendResult<RwLockWriteGuard<'_, InMemoryBackendState>> {
        self.state
            .write()
            .map_err(|err| TaskBackendError::backend(std::io::Error::other(err.to_string())))
    }

    /// Sets the raw state reported for a task.
    ///
    /// # Errors
    ///
    /// Returns backend errors when lock acquisition fails.
    pub fn set_state(&self, task_id: &TaskId, raw_state: impl Into<String>) -> TaskBackendResult<()> {
        let mut state = self.write()?;
        let reported = raw_state.into();
        match state.tasks.get_mut(task_id) {
            Some(task) => task.state = reported,
            None => {
                state.tasks.insert(
                    task_id.clone(),
                    BackendTask {
                        state: reported,
                        outcome: None,
                    },
                );
            }
        }
        Ok(())
    }

    /// Stores a terminal outcome, reporting `SUCCESS` for values and
    /// `FAILURE` for errors.
    ///
    /// # Errors
    ///
    /// Returns backend errors when lock acquisition fails.
    pub fn complete(&self, task_id: &TaskId, outcome: TaskOutcome) -> TaskBackendResult<()> {
        let mut state = self.write()?;
        let raw_state = match outcome {
            TaskOutcome::Value(_) => "SUCCESS",
            TaskOutcome::Error(_) => "FAILURE",
        };
        state.tasks.insert(
            task_id.clone(),
            BackendTask {
                state: raw_state.to_owned(),
                outcome: Some(outcome),
            },
        );
        Ok(())
    }

    /// Makes state queries for a task fail with a corrupted-record error.
    ///
    /// # Errors
    ///
    /// Returns backend errors when lock acquisition fails.
    pub fn break_state(&self, task_id: &TaskId, reason: impl Into<String>) -> TaskBackendResult<()> {
        let mut state = self.write()?;
        state.broken_states.insert(task_id.clone(), reason.into());
        Ok(())
    }

    /// Makes result fetches for a task fail with a corrupted-record error.
    ///
    /// # Errors
    ///
    /// Returns backend errors when lock acquisition fails.
    pub fn break_result(
        &self,
        task_id: &TaskId,
        reason: impl Into<String>,
    ) -> TaskBackendResult<()> {
        let mut state = self.write()?;
        state.broken_results.insert(task_id.clone(), reason.into());
        Ok(())
    }

    /// Returns every submission received, oldest first.
    ///
    /// # Errors
    ///
    /// Returns backend errors when lock acquisition fails.
    pub fn submissions(&self) -> TaskBackendResult<Vec<TaskSubmission>> {
        Ok(self.read()?.submissions.clone())
    }

    /// Returns every forgotten task identifier, oldest first.
    ///
    /// # Errors
    ///
    /// Returns backend errors when lock acquisition fails.
    pub fn forgotten(&self) -> TaskBackendResult<Vec<TaskId>> {
        Ok(self.read()?.forgotten.clone())
    }
}

#[async_trait]
impl TaskBackend for InMemoryTaskBackend {
    async fn state(&self, task_id: &TaskId) -> TaskBackendResult<String> {
        let state = self.read()?;
        if let Some(reason) = state.broken_states.get(task_id) {
            return Err(TaskBackendError::Corrupted {
                task_id: task_id.clone(),
                reason: reason.clone(),
            });
        }
        Ok(state
            .tasks
            .get(task_id)
            .map_or_else(|| UNKNOWN_TASK_STATE.to_owned(), |task| task.state.clone()))
    }

    async fn is_ready(&self, task_id: &TaskId) -> TaskBackendResult<bool> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(task_id)
            .is_some_and(|task| READY_STATES.contains(&task.state.as_str())))
    }

    async fn result(&self, task_id: &TaskId) -> TaskBackendResult<TaskOutcome> {
        let state = self.read()?;
        if let Some(reason) = state.broken_results.get(task_id) {
            return Err(TaskBackendError::Corrupted {
                task_id: task_id.clone(),
                reason: reason.clone(),
            });
        }
        Ok(state
            .tasks
            .get(task_id)
            .and_then(|task| task.outcome.clone())
            .unwrap_or(TaskOutcome::Value(serde_json::Value::Null)))
    }

    async fn forget(&self, task_id: &TaskId) -> TaskBackendResult<()> {
        let mut state = self.write()?;
        state.tasks.remove(task_id);
        state.forgotten.push(task_id.clone());
        Ok(())
    }

    async fn submit(&self, submission: &TaskSubmission) -> TaskBackendResult<TaskHandle> {
        let mut state = self.write()?;
        state.tasks.insert(
            submission.task_id.clone(),
            BackendTask {
                state: UNKNOWN_TASK_STATE.to_owned(),
                outcome: None,
            },
        );
        state.submissions.push(submission.clone());
        Ok(TaskHandle::new(submission.task_id.clone()))
    }
}
