//! Task lifecycle states as reported by the task backend.

use super::ParseTaskStateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a tracked task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskMetaState {
    /// Submitted to the backend but not yet picked up by a worker.
    #[default]
    Pending,
    /// A worker has started executing the task.
    Started,
    /// The task failed and is waiting to be retried.
    Retry,
    /// The task finished with an error.
    Failure,
    /// The task finished successfully.
    Success,
    /// The backend chose to skip the task.
    Ignored,
}

/// Every task state, in persistence code order.
pub const ALL_TASK_STATES: [TaskMetaState; 6] = [
    TaskMetaState::Pending,
    TaskMetaState::Started,
    TaskMetaState::Retry,
    TaskMetaState::Failure,
    TaskMetaState::Success,
    TaskMetaState::Ignored,
];

impl TaskMetaState {
    /// Maps a raw backend state name onto a task state.
    ///
    /// Unknown names classify as [`TaskMetaState::Failure`].
    ///
    /// # Examples
    ///
    /// ```
    /// use taskwatch::task::domain::TaskMetaState;
    ///
    /// assert_eq!(TaskMetaState::classify("STARTED"), TaskMetaState::Started);
    /// assert_eq!(TaskMetaState::classify("REVOKED"), TaskMetaState::Failure);
    /// ```
    #[must_use]
    pub fn classify(raw_state: &str) -> Self {
        match raw_state {
            "PENDING" => Self::Pending,
            "STARTED" => Self::Started,
            "RETRY" => Self::Retry,
            "SUCCESS" => Self::Success,
            "IGNORED" => Self::Ignored,
            _ => Self::Failure,
        }
    }

    /// Returns the display and backend name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Retry => "RETRY",
            Self::Failure => "FAILURE",
            Self::Success => "SUCCESS",
            Self::Ignored => "IGNORED",
        }
    }

    /// Returns the stable numeric code used by persistence.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Started => 1,
            Self::Retry => 2,
            Self::Failure => 3,
            Self::Success => 4,
            Self::Ignored => 5,
        }
    }

    /// Converts a persistence code back into a state.
    ///
    /// # Errors
    ///
    /// Returns [`ParseTaskStateError`] when the code is outside `0..=5`.
    pub fn from_code(code: i16) -> Result<Self, ParseTaskStateError> {
        ALL_TASK_STATES
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or_else(|| ParseTaskStateError(code.to_string()))
    }

    /// Returns the group this state belongs to.
    #[must_use]
    pub const fn group(self) -> TaskStateGroup {
        match self {
            Self::Pending | Self::Started | Self::Retry => TaskStateGroup::Running,
            Self::Failure | Self::Success => TaskStateGroup::Ready,
            Self::Ignored => TaskStateGroup::Skipped,
        }
    }

    /// Returns `true` while the backend may still act on the task.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self.group(), TaskStateGroup::Running)
    }

    /// Returns `true` once the task has a terminal result.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self.group(), TaskStateGroup::Ready)
    }
}

impl fmt::Display for TaskMetaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived grouping of task states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStateGroup {
    /// Pending, started or retrying.
    Running,
    /// Failed or succeeded.
    Ready,
    /// Ignored by the backend.
    Skipped,
}

impl TaskStateGroup {
    /// Returns the states that make up this group.
    #[must_use]
    pub fn states(self) -> Vec<TaskMetaState> {
        ALL_TASK_STATES
            .into_iter()
            .filter(|state| state.group() == self)
            .collect()
    }
}

/// State predicate applied by task queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStateFilter {
    /// Matches records with exactly this state.
    State(TaskMetaState),
    /// Matches records whose state belongs to this group.
    Group(TaskStateGroup),
}

impl TaskStateFilter {
    /// Returns `true` when `state` satisfies the filter.
    #[must_use]
    pub fn matches(self, state: TaskMetaState) -> bool {
        match self {
            Self::State(expected) => state == expected,
            Self::Group(group) => state.group() == group,
        }
    }

    /// Returns the states accepted by the filter.
    #[must_use]
    pub fn states(self) -> Vec<TaskMetaState> {
        match self {
            Self::State(state) => vec![state],
            Self::Group(group) => group.states(),
        }
    }
}

impl From<TaskMetaState> for TaskStateFilter {
    fn from(state: TaskMetaState) -> Self {
        Self::State(state)
    }
}

impl From<TaskStateGroup> for TaskStateFilter {
    fn from(group: TaskStateGroup) -> Self {
        Self::Group(group)
    }
}
