//! Event handlers keeping task records in step with backend transitions.

use crate::task::{
    domain::{TaskId, TaskMetaState},
    ports::{TaskRecordQuery, TaskRecordRepository, TaskRepositoryResult},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Backend lifecycle event concerning one task.
///
/// Identifiers are optional because event sources may emit events for jobs
/// submitted outside of task tracking; such events are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The job was published to the broker.
    Published {
        /// Task identifier, when known.
        task_id: Option<TaskId>,
    },
    /// A worker is about to run the job.
    PreRun {
        /// Task identifier, when known.
        task_id: Option<TaskId>,
    },
    /// A worker finished running the job.
    PostRun {
        /// Task identifier, when known.
        task_id: Option<TaskId>,
        /// Raw backend state reported on completion.
        state: Option<String>,
    },
    /// The job was revoked.
    Revoked {
        /// Task identifier, when known.
        task_id: Option<TaskId>,
    },
}

impl TaskEvent {
    /// Returns the event name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::PreRun { .. } => "pre_run",
            Self::PostRun { .. } => "post_run",
            Self::Revoked { .. } => "revoked",
        }
    }

    /// Returns the task identifier carried by the event.
    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        match self {
            Self::Published { task_id }
            | Self::PreRun { task_id }
            | Self::PostRun { task_id, .. }
            | Self::Revoked { task_id } => task_id.as_ref(),
        }
    }
}

/// Best-effort, idempotent handlers for task lifecycle events.
///
/// Handlers only touch existing records and never fail: repository errors
/// are logged and swallowed.
#[derive(Clone)]
pub struct TaskLifecycleHooks<R, C>
where
    R: TaskRecordRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TaskLifecycleHooks<R, C>
where
    R: TaskRecordRepository,
    C: Clock + Send + Sync,
{
    /// Creates hooks writing through the given repository.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Dispatches one event to its handler.
    pub async fn handle(&self, event: TaskEvent) {
        let event_name = event.name();
        match event {
            TaskEvent::Published { task_id: Some(task_id) } => self.on_publish(&task_id).await,
            TaskEvent::PreRun { task_id: Some(task_id) } => self.on_start(&task_id).await,
            TaskEvent::PostRun {
                task_id: Some(task_id),
                state,
            } => self.on_finish(&task_id, state.as_deref()).await,
            TaskEvent::Revoked { task_id: Some(task_id) } => self.on_revoke(&task_id).await,
            TaskEvent::Published { task_id: None }
            | TaskEvent::PreRun { task_id: None }
            | TaskEvent::PostRun { task_id: None, .. }
            | TaskEvent::Revoked { task_id: None } => {
                debug!(event = event_name, "task event without identifier ignored");
            }
        }
    }

    /// Marks the task as pending after it was published.
    pub async fn on_publish(&self, task_id: &TaskId) {
        self.set_state(task_id, TaskMetaState::Pending, "published")
            .await;
    }

    /// Marks the task as started.
    pub async fn on_start(&self, task_id: &TaskId) {
        self.set_state(task_id, TaskMetaState::Started, "pre_run")
            .await;
    }

    /// Stores the classified terminal state. A missing state is ignored.
    pub async fn on_finish(&self, task_id: &TaskId, raw_state: Option<&str>) {
        let Some(raw) = raw_state else {
            debug!(task_id = %task_id, "post-run event without state ignored");
            return;
        };
        self.set_state(task_id, TaskMetaState::classify(raw), "post_run")
            .await;
    }

    /// Deletes the record of a revoked task.
    pub async fn on_revoke(&self, task_id: &TaskId) {
        let outcome = self
            .repository
            .delete(&TaskRecordQuery::for_task(task_id.clone()))
            .await;
        log_outcome(task_id, "revoked", &outcome);
    }

    async fn set_state(&self, task_id: &TaskId, state: TaskMetaState, event: &'static str) {
        let outcome = self
            .repository
            .update_state(task_id, state, self.clock.utc())
            .await;
        log_outcome(task_id, event, &outcome);
    }
}

fn log_outcome(task_id: &TaskId, event: &'static str, outcome: &TaskRepositoryResult<u64>) {
    match outcome {
        Ok(0) => debug!(task_id = %task_id, event, "no task record matched event"),
        Ok(_) => debug!(task_id = %task_id, event, "task record updated from event"),
        Err(err) => error!(
            task_id = %task_id,
            event,
            error = %err,
            "failed to apply task event"
        ),
    }
}

/// Drains a channel of task events into [`TaskLifecycleHooks`].
pub struct TaskEventListener<R, C>
where
    R: TaskRecordRepository,
    C: Clock + Send + Sync,
{
    hooks: TaskLifecycleHooks<R, C>,
    events: mpsc::Receiver<TaskEvent>,
}

impl<R, C> TaskEventListener<R, C>
where
    R: TaskRecordRepository,
    C: Clock + Send + Sync,
{
    /// Creates a listener over the receiving half of an event channel.
    #[must_use]
    pub const fn new(hooks: TaskLifecycleHooks<R, C>, events: mpsc::Receiver<TaskEvent>) -> Self {
        Self { hooks, events }
    }

    /// Handles events until every sender has been dropped and returns the
    /// number of events processed.
    pub async fn run(mut self) -> u64 {
        let mut handled = 0;
        while let Some(event) = self.events.recv().await {
            self.hooks.handle(event).await;
            handled += 1;
        }
        debug!(handled, "task event channel closed");
        handled
    }
}
