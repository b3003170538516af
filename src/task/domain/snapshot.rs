//! Consolidated task status of one owner.

use super::{TaskId, TaskMetaState, TaskOutcome, TaskRecord};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

/// Overall task status of an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerTaskStatus {
    /// The owner has a running task.
    Busy,
    /// No task is running for the owner.
    Ready,
}

impl OwnerTaskStatus {
    /// Returns the serialized name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Busy => "busy",
            Self::Ready => "ready",
        }
    }
}

/// Summary of the task currently running for an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunningTaskSummary {
    /// Task identifier.
    pub task_id: TaskId,
    /// Task name.
    pub task_name: String,
    /// Current state.
    pub state: TaskMetaState,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Time since submission, serialized in milliseconds.
    #[serde(serialize_with = "serialize_millis")]
    pub execution_time: TimeDelta,
}

impl RunningTaskSummary {
    /// Summarizes a running record as observed at `now`.
    #[must_use]
    pub fn from_record(record: &TaskRecord, now: DateTime<Utc>) -> Self {
        Self {
            task_id: record.task_id().clone(),
            task_name: record.task_name().to_owned(),
            state: record.state(),
            created_at: record.created_at(),
            execution_time: record.elapsed_at(now),
        }
    }
}

/// Result or error reported for the last finished task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyTaskOutcome {
    /// Display form of the returned value.
    Result(String),
    /// Message of the raised error.
    ErrorMessage(String),
}

impl From<&TaskOutcome> for ReadyTaskOutcome {
    fn from(outcome: &TaskOutcome) -> Self {
        match outcome.error_message() {
            Some(message) => Self::ErrorMessage(message.to_owned()),
            None => Self::Result(outcome.to_string()),
        }
    }
}

/// Summary of the most recently finished task of an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyTaskSummary {
    /// Task identifier.
    pub task_id: TaskId,
    /// Task name.
    pub task_name: String,
    /// Terminal state.
    pub state: TaskMetaState,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the terminal state change.
    pub updated_at: DateTime<Utc>,
    /// Time from submission to completion, serialized in milliseconds.
    #[serde(serialize_with = "serialize_millis")]
    pub execution_time: TimeDelta,
    /// Returned value or error.
    #[serde(flatten)]
    pub outcome: ReadyTaskOutcome,
}

impl ReadyTaskSummary {
    /// Summarizes a ready record together with its backend outcome.
    #[must_use]
    pub fn from_record(record: &TaskRecord, outcome: &TaskOutcome) -> Self {
        Self {
            task_id: record.task_id().clone(),
            task_name: record.task_name().to_owned(),
            state: record.state(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
            execution_time: record.execution_time(),
            outcome: ReadyTaskOutcome::from(outcome),
        }
    }
}

/// Status snapshot assembled by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatusSnapshot {
    /// Overall status.
    pub status: OwnerTaskStatus,
    /// Currently running task, when busy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_task: Option<RunningTaskSummary>,
    /// Last finished task, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ready_task: Option<ReadyTaskSummary>,
}

impl TaskStatusSnapshot {
    /// Builds a snapshot from the optional running and ready summaries.
    #[must_use]
    pub const fn new(
        running_task: Option<RunningTaskSummary>,
        last_ready_task: Option<ReadyTaskSummary>,
    ) -> Self {
        let status = if running_task.is_some() {
            OwnerTaskStatus::Busy
        } else {
            OwnerTaskStatus::Ready
        };
        Self {
            status,
            running_task,
            last_ready_task,
        }
    }
}

fn serialize_millis<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(delta.num_milliseconds())
}
