//! In-memory task record repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{OwnerRef, TaskId, TaskMetaState, TaskRecord},
    ports::{
        TaskRecordOrder, TaskRecordQuery, TaskRecordRepository, TaskRepositoryError,
        TaskRepositoryResult,
    },
};

/// Thread-safe in-memory task record repository.
///
/// Insertion order is tracked with a monotonic sequence that survives
/// [`TaskRecordRepository::save`] but not deletion and reinsertion.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRecordRepository {
    state: Arc<RwLock<InMemoryTaskRecordState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskRecordState {
    records: HashMap<TaskId, StoredRecord>,
    next_sequence: u64,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    sequence: u64,
    record: TaskRecord,
}

impl InMemoryTaskRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskRecordState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskRecordState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Returns matching records sorted by insertion order.
fn matching<'a>(state: &'a InMemoryTaskRecordState, query: &TaskRecordQuery) -> Vec<&'a StoredRecord> {
    let mut found: Vec<&StoredRecord> = state
        .records
        .values()
        .filter(|stored| query.matches(&stored.record))
        .collect();
    found.sort_by_key(|stored| stored.sequence);
    found
}

fn to_count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl TaskRecordRepository for InMemoryTaskRecordRepository {
    async fn insert(&self, record: &TaskRecord) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.records.contains_key(record.task_id()) {
            return Err(TaskRepositoryError::DuplicateTask(record.task_id().clone()));
        }
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.records.insert(
            record.task_id().clone(),
            StoredRecord {
                sequence,
                record: record.clone(),
            },
        );
        Ok(())
    }

    async fn save(&self, record: &TaskRecord) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .records
            .get_mut(record.task_id())
            .ok_or_else(|| TaskRepositoryError::NotFound(record.task_id().clone()))?;
        stored.record = record.clone();
        Ok(())
    }

    async fn find_by_task_id(&self, task_id: &TaskId) -> TaskRepositoryResult<Option<TaskRecord>> {
        let state = self.read()?;
        Ok(state.records.get(task_id).map(|stored| stored.record.clone()))
    }

    async fn find(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<Vec<TaskRecord>> {
        let state = self.read()?;
        Ok(matching(&state, query)
            .into_iter()
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn first(
        &self,
        query: &TaskRecordQuery,
        order: TaskRecordOrder,
    ) -> TaskRepositoryResult<Option<TaskRecord>> {
        let state = self.read()?;
        let candidates = matching(&state, query).into_iter();
        let selected = match order {
            TaskRecordOrder::Newest => candidates.max_by_key(|stored| stored.sequence),
            TaskRecordOrder::LastUpdated => {
                candidates.max_by_key(|stored| (stored.record.updated_at(), stored.sequence))
            }
        };
        Ok(selected.map(|stored| stored.record.clone()))
    }

    async fn owners(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<Vec<OwnerRef>> {
        let state = self.read()?;
        let mut owners: Vec<OwnerRef> = matching(&state, query)
            .into_iter()
            .map(|stored| stored.record.owner().clone())
            .collect();
        owners.sort();
        owners.dedup();
        Ok(owners)
    }

    async fn update_state(
        &self,
        task_id: &TaskId,
        state: TaskMetaState,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<u64> {
        let mut guard = self.write()?;
        let Some(stored) = guard.records.get_mut(task_id) else {
            return Ok(0);
        };
        stored.record.record_state(state, updated_at);
        Ok(1)
    }

    async fn block_ui(&self, task_id: &TaskId) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let Some(stored) = state.records.get_mut(task_id) else {
            return Ok(0);
        };
        stored.record.block_ui();
        Ok(1)
    }

    async fn delete(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let before = state.records.len();
        state.records.retain(|_, stored| !query.matches(&stored.record));
        Ok(to_count(before - state.records.len()))
    }
}
