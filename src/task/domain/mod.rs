//! Domain model for background task tracking.
//!
//! The task domain models the local mirror of backend task state, the owner
//! references tasks hang off, and the status snapshots derived from them,
//! while keeping all infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod outcome;
mod record;
mod snapshot;
mod state;
mod worker;

pub use error::{ParseTaskStateError, TaskDomainError};
pub use ids::{OwnerId, OwnerKind, OwnerRef, TaskId};
pub use outcome::{TaskHandle, TaskOutcome};
pub use record::{PersistedTaskRecordData, TaskRecord};
pub use snapshot::{
    OwnerTaskStatus, ReadyTaskOutcome, ReadyTaskSummary, RunningTaskSummary, TaskStatusSnapshot,
};
pub use state::{ALL_TASK_STATES, TaskMetaState, TaskStateFilter, TaskStateGroup};
pub use worker::{WorkerAvailability, WorkerStatus};
