//! Repository port for task record persistence and predicate queries.

use crate::task::domain::{
    OwnerKind, OwnerRef, TaskId, TaskMetaState, TaskRecord, TaskStateFilter,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task record repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Predicate selecting task records.
///
/// Every populated field must match; an empty query matches every record.
///
/// # Examples
///
/// ```
/// use taskwatch::task::domain::{OwnerRef, TaskStateGroup};
/// use taskwatch::task::ports::TaskRecordQuery;
///
/// let owner = OwnerRef::from_parts("invoice", 7).expect("valid owner");
/// let query = TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Ready);
/// assert_eq!(query.owner(), Some(&owner));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRecordQuery {
    owner: Option<OwnerRef>,
    owner_kind: Option<OwnerKind>,
    task_id: Option<TaskId>,
    excluded_task_id: Option<TaskId>,
    state: Option<TaskStateFilter>,
}

impl TaskRecordQuery {
    /// Matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the records of one owner.
    #[must_use]
    pub fn for_owner(owner: OwnerRef) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    /// Matches the record with the given task identifier.
    #[must_use]
    pub fn for_task(task_id: TaskId) -> Self {
        Self {
            task_id: Some(task_id),
            ..Self::default()
        }
    }

    /// Restricts the query to owners of one kind.
    #[must_use]
    pub fn with_owner_kind(mut self, kind: OwnerKind) -> Self {
        self.owner_kind = Some(kind);
        self
    }

    /// Restricts the query to one task identifier.
    #[must_use]
    pub fn with_task_id(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Restricts the query to a state or state group.
    #[must_use]
    pub fn with_state(mut self, filter: impl Into<TaskStateFilter>) -> Self {
        self.state = Some(filter.into());
        self
    }

    /// Excludes the record with the given task identifier.
    #[must_use]
    pub fn excluding(mut self, task_id: TaskId) -> Self {
        self.excluded_task_id = Some(task_id);
        self
    }

    /// Returns the owner constraint.
    #[must_use]
    pub const fn owner(&self) -> Option<&OwnerRef> {
        self.owner.as_ref()
    }

    /// Returns the owner kind constraint.
    #[must_use]
    pub const fn owner_kind(&self) -> Option<&OwnerKind> {
        self.owner_kind.as_ref()
    }

    /// Returns the task identifier constraint.
    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    /// Returns the excluded task identifier.
    #[must_use]
    pub const fn excluded_task_id(&self) -> Option<&TaskId> {
        self.excluded_task_id.as_ref()
    }

    /// Returns the state constraint.
    #[must_use]
    pub const fn state(&self) -> Option<TaskStateFilter> {
        self.state
    }

    /// Evaluates the predicate against a record.
    #[must_use]
    pub fn matches(&self, record: &TaskRecord) -> bool {
        self.owner.as_ref().is_none_or(|owner| record.owner() == owner)
            && self
                .owner_kind
                .as_ref()
                .is_none_or(|kind| record.owner().kind() == kind)
            && self
                .task_id
                .as_ref()
                .is_none_or(|task_id| record.task_id() == task_id)
            && self
                .excluded_task_id
                .as_ref()
                .is_none_or(|task_id| record.task_id() != task_id)
            && self.state.is_none_or(|filter| filter.matches(record.state()))
    }
}

/// Ordering used when a query should yield a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskRecordOrder {
    /// Latest inserted record first.
    Newest,
    /// Latest `updated_at` first, ties broken by insertion order.
    LastUpdated,
}

/// Task record persistence contract.
///
/// Mutations other than [`TaskRecordRepository::save`] are narrow updates
/// keyed by task identifier, so concurrent writers degrade to last write
/// wins on the touched fields.
#[async_trait]
pub trait TaskRecordRepository: Send + Sync {
    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn insert(&self, record: &TaskRecord) -> TaskRepositoryResult<()>;

    /// Overwrites an existing record, keeping its insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the record does not
    /// exist.
    async fn save(&self, record: &TaskRecord) -> TaskRepositoryResult<()>;

    /// Finds a record by task identifier.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_task_id(&self, task_id: &TaskId) -> TaskRepositoryResult<Option<TaskRecord>>;

    /// Returns all matching records in insertion order.
    async fn find(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<Vec<TaskRecord>>;

    /// Returns the first matching record under the given ordering.
    async fn first(
        &self,
        query: &TaskRecordQuery,
        order: TaskRecordOrder,
    ) -> TaskRepositoryResult<Option<TaskRecord>>;

    /// Returns the distinct owners having at least one matching record.
    async fn owners(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<Vec<OwnerRef>>;

    /// Sets the state and `updated_at` of one record.
    ///
    /// Returns the number of records updated (zero when absent).
    async fn update_state(
        &self,
        task_id: &TaskId,
        state: TaskMetaState,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<u64>;

    /// Marks one record as UI-blocking. The flag is never cleared.
    ///
    /// Returns the number of records updated (zero when absent).
    async fn block_ui(&self, task_id: &TaskId) -> TaskRepositoryResult<u64>;

    /// Deletes every matching record and returns how many were removed.
    async fn delete(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<u64>;

    /// Returns `true` when at least one record matches.
    async fn exists(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<bool> {
        Ok(self.first(query, TaskRecordOrder::Newest).await?.is_some())
    }
}

/// Errors returned by task record repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A record with the same task identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The record was not found.
    #[error("task record not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
