//! Owner-facing task submission, result access and task queries.

use super::{TaskTrackingError, TaskTrackingResult};
use crate::task::{
    domain::{
        OwnerKind, OwnerRef, TaskHandle, TaskId, TaskRecord, TaskStateFilter, TaskStateGroup,
    },
    ports::{TaskBackend, TaskRecordOrder, TaskRecordQuery, TaskRecordRepository, TaskSubmission},
};
use mockable::Clock;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Label shown in listings for owners with a running task.
pub const RUNNING_LABEL: &str = "Running";

/// Label shown in listings for owners without a running task.
pub const READY_LABEL: &str = "Ready";

/// Request payload for submitting a background task on behalf of an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTaskRequest {
    task_name: String,
    args: Value,
    task_id: Option<TaskId>,
    ui_block: bool,
}

impl SubmitTaskRequest {
    /// Creates a request for the given job name and JSON arguments.
    #[must_use]
    pub fn new(task_name: impl Into<String>, args: Value) -> Self {
        Self {
            task_name: task_name.into(),
            args,
            task_id: None,
            ui_block: false,
        }
    }

    /// Reuses an explicit task identifier instead of generating one.
    #[must_use]
    pub fn with_task_id(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Requests that the interface blocks on the task from the start.
    #[must_use]
    pub const fn with_ui_block(mut self, ui_block: bool) -> Self {
        self.ui_block = ui_block;
        self
    }

    /// Returns the job name.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Returns the explicit task identifier, if any.
    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    /// Returns whether the task blocks the interface from the start.
    #[must_use]
    pub const fn ui_block(&self) -> bool {
        self.ui_block
    }
}

/// Owner-facing façade over task records and the task backend.
#[derive(Clone)]
pub struct OwnerTaskService<R, B, C>
where
    R: TaskRecordRepository,
    B: TaskBackend,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    backend: Arc<B>,
    clock: Arc<C>,
}

impl<R, B, C> OwnerTaskService<R, B, C>
where
    R: TaskRecordRepository,
    B: TaskBackend,
    C: Clock + Send + Sync,
{
    /// Creates a new owner task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, backend: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            repository,
            backend,
            clock,
        }
    }

    /// Records and submits a task for an owner.
    ///
    /// When the request names an existing record, the backend's stale
    /// result is forgotten and the record is rebound to the new submission
    /// with its state reset to pending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError`] when the store or the backend fails.
    pub async fn submit(
        &self,
        owner: &OwnerRef,
        request: SubmitTaskRequest,
    ) -> TaskTrackingResult<TaskHandle> {
        let SubmitTaskRequest {
            task_name,
            args,
            task_id,
            ui_block,
        } = request;
        let resolved_id = task_id.unwrap_or_else(TaskId::generate);

        match self.repository.find_by_task_id(&resolved_id).await? {
            Some(mut existing) => {
                if self.backend.is_ready(&resolved_id).await? {
                    self.backend.forget(&resolved_id).await?;
                    debug!(task_id = %resolved_id, "forgot stale result before resubmission");
                }
                existing.reassign(owner.clone(), task_name.clone(), ui_block, &*self.clock);
                self.repository.save(&existing).await?;
            }
            None => {
                let record = TaskRecord::new(
                    resolved_id.clone(),
                    owner.clone(),
                    task_name.clone(),
                    ui_block,
                    &*self.clock,
                );
                self.repository.insert(&record).await?;
            }
        }

        let handle = self
            .backend
            .submit(&TaskSubmission::new(resolved_id, task_name, args))
            .await?;
        info!(
            owner = %owner,
            task_id = %handle.task_id(),
            ui_block,
            "task submitted"
        );
        Ok(handle)
    }

    /// Returns the backend handle of one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::NotFound`] when the owner has no task
    /// with that identifier.
    pub async fn result(&self, owner: &OwnerRef, task_id: &TaskId) -> TaskTrackingResult<TaskHandle> {
        let record = self.owned_record(owner, task_id).await?;
        Ok(TaskHandle::new(record.task_id().clone()))
    }

    /// Returns the backend handles of every task of the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn results(&self, owner: &OwnerRef) -> TaskTrackingResult<Vec<TaskHandle>> {
        let records = self.tasks(owner, None).await?;
        Ok(records
            .into_iter()
            .map(|record| TaskHandle::new(record.task_id().clone()))
            .collect())
    }

    /// Forgets the backend result of one of the owner's tasks when ready.
    ///
    /// The task record itself is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::NotFound`] when the owner has no task
    /// with that identifier, or a backend error when forgetting fails.
    pub async fn clear_result(&self, owner: &OwnerRef, task_id: &TaskId) -> TaskTrackingResult<()> {
        let record = self.owned_record(owner, task_id).await?;
        self.forget_if_ready(record.task_id()).await
    }

    /// Forgets the ready backend results of every task of the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError`] when the store or the backend fails.
    pub async fn clear_results(&self, owner: &OwnerRef) -> TaskTrackingResult<()> {
        for record in self.tasks(owner, None).await? {
            self.forget_if_ready(record.task_id()).await?;
        }
        Ok(())
    }

    /// Returns `true` when the owner has a pending, started or retrying task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn has_running_task(&self, owner: &OwnerRef) -> TaskTrackingResult<bool> {
        Ok(self
            .repository
            .exists(&TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Running))
            .await?)
    }

    /// Returns `true` when the owner has a finished task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn has_ready_task(&self, owner: &OwnerRef) -> TaskTrackingResult<bool> {
        Ok(self
            .repository
            .exists(&TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Ready))
            .await?)
    }

    /// Returns the most recently submitted running task of the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn current_running_task(
        &self,
        owner: &OwnerRef,
    ) -> TaskTrackingResult<Option<TaskRecord>> {
        Ok(self
            .repository
            .first(
                &TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Running),
                TaskRecordOrder::Newest,
            )
            .await?)
    }

    /// Returns the most recently updated finished task of the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn last_ready_task(&self, owner: &OwnerRef) -> TaskTrackingResult<Option<TaskRecord>> {
        Ok(self
            .repository
            .first(
                &TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Ready),
                TaskRecordOrder::LastUpdated,
            )
            .await?)
    }

    /// Returns the owner's tasks in submission order, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn tasks(
        &self,
        owner: &OwnerRef,
        filter: Option<TaskStateFilter>,
    ) -> TaskTrackingResult<Vec<TaskRecord>> {
        let query = with_filter(TaskRecordQuery::for_owner(owner.clone()), filter);
        Ok(self.repository.find(&query).await?)
    }

    /// Returns the distinct owners of one kind having a matching task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn owners_with_tasks(
        &self,
        kind: &OwnerKind,
        filter: Option<TaskStateFilter>,
    ) -> TaskTrackingResult<Vec<OwnerRef>> {
        let query = with_filter(TaskRecordQuery::all().with_owner_kind(kind.clone()), filter);
        Ok(self.repository.owners(&query).await?)
    }

    /// Returns the candidates that have no matching task, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn owners_without_tasks(
        &self,
        candidates: impl IntoIterator<Item = OwnerRef> + Send,
        filter: Option<TaskStateFilter>,
    ) -> TaskTrackingResult<Vec<OwnerRef>> {
        let with_tasks: BTreeSet<OwnerRef> = self
            .repository
            .owners(&with_filter(TaskRecordQuery::all(), filter))
            .await?
            .into_iter()
            .collect();
        Ok(candidates
            .into_iter()
            .filter(|candidate| !with_tasks.contains(candidate))
            .collect())
    }

    /// Returns the listing label describing whether the owner is busy.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn running_label(&self, owner: &OwnerRef) -> TaskTrackingResult<&'static str> {
        if self.has_running_task(owner).await? {
            Ok(RUNNING_LABEL)
        } else {
            Ok(READY_LABEL)
        }
    }

    async fn owned_record(&self, owner: &OwnerRef, task_id: &TaskId) -> TaskTrackingResult<TaskRecord> {
        self.repository
            .first(
                &TaskRecordQuery::for_owner(owner.clone()).with_task_id(task_id.clone()),
                TaskRecordOrder::Newest,
            )
            .await?
            .ok_or_else(|| TaskTrackingError::NotFound {
                owner: owner.clone(),
                task_id: task_id.clone(),
            })
    }

    async fn forget_if_ready(&self, task_id: &TaskId) -> TaskTrackingResult<()> {
        if self.backend.is_ready(task_id).await? {
            self.backend.forget(task_id).await?;
            debug!(task_id = %task_id, "task result forgotten");
        }
        Ok(())
    }
}

fn with_filter(query: TaskRecordQuery, filter: Option<TaskStateFilter>) -> TaskRecordQuery {
    if let Some(state) = filter {
        return query.with_state(state);
    }
    query
}
