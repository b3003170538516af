//! Persisted mirror of one backend task.

use super::{OwnerRef, TaskId, TaskMetaState};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Locally tracked state of one submitted background task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    task_id: TaskId,
    owner: OwnerRef,
    task_name: String,
    state: TaskMetaState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    ui_block: bool,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskRecordData {
    /// Persisted task identifier.
    pub task_id: TaskId,
    /// Persisted owner reference.
    pub owner: OwnerRef,
    /// Persisted task name.
    pub task_name: String,
    /// Persisted lifecycle state.
    pub state: TaskMetaState,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest state timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted UI-blocking flag.
    pub ui_block: bool,
}

impl TaskRecord {
    /// Creates a pending record for a task about to be submitted.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        owner: OwnerRef,
        task_name: impl Into<String>,
        ui_block: bool,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            task_id,
            owner,
            task_name: task_name.into(),
            state: TaskMetaState::Pending,
            created_at: timestamp,
            updated_at: timestamp,
            ui_block,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskRecordData) -> Self {
        Self {
            task_id: data.task_id,
            owner: data.owner,
            task_name: data.task_name,
            state: data.state,
            created_at: data.created_at,
            updated_at: data.updated_at,
            ui_block: data.ui_block,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the owner reference.
    #[must_use]
    pub const fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// Returns the task name.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskMetaState {
        self.state
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest state timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the interface should block on this task.
    #[must_use]
    pub const fn ui_block(&self) -> bool {
        self.ui_block
    }

    /// Rebinds the record to a new submission of the same task id.
    ///
    /// The state returns to [`TaskMetaState::Pending`]; `created_at` is kept.
    pub fn reassign(
        &mut self,
        owner: OwnerRef,
        task_name: impl Into<String>,
        ui_block: bool,
        clock: &impl Clock,
    ) {
        self.owner = owner;
        self.task_name = task_name.into();
        self.ui_block = ui_block;
        self.state = TaskMetaState::Pending;
        self.touch(clock);
    }

    /// Records a state observed at the given instant.
    pub const fn record_state(&mut self, state: TaskMetaState, updated_at: DateTime<Utc>) {
        self.state = state;
        self.updated_at = updated_at;
    }

    /// Marks the task as UI-blocking. The flag is never cleared.
    pub const fn block_ui(&mut self) {
        self.ui_block = true;
    }

    /// Returns the time elapsed since submission.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.created_at
    }

    /// Returns the time between submission and the latest state change.
    #[must_use]
    pub fn execution_time(&self) -> TimeDelta {
        self.updated_at - self.created_at
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
