//! Shared fixtures for task tracking unit tests.

use crate::task::{
    adapters::memory::{InMemoryTaskBackend, InMemoryTaskRecordRepository},
    config::TaskStatusConfig,
    domain::{OwnerRef, PersistedTaskRecordData, TaskId, TaskMetaState, TaskRecord},
    ports::TaskRecordRepository,
    services::{OwnerTaskService, TaskLifecycleHooks, TaskReconciler},
};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use std::sync::{Arc, Mutex, PoisonError};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixed timestamp")
}

pub fn task_id(value: &str) -> TaskId {
    TaskId::new(value).expect("valid task id")
}

pub fn owner(kind: &str, id: u64) -> OwnerRef {
    OwnerRef::from_parts(kind, id).expect("valid owner")
}

pub type TestReconciler =
    TaskReconciler<InMemoryTaskRecordRepository, InMemoryTaskBackend, ManualClock>;
pub type TestOwnerService =
    OwnerTaskService<InMemoryTaskRecordRepository, InMemoryTaskBackend, ManualClock>;
pub type TestHooks = TaskLifecycleHooks<InMemoryTaskRecordRepository, ManualClock>;

/// In-memory adapters wired to one manual clock.
pub struct Harness {
    pub repository: Arc<InMemoryTaskRecordRepository>,
    pub backend: Arc<InMemoryTaskBackend>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryTaskRecordRepository::new()),
            backend: Arc::new(InMemoryTaskBackend::new()),
            clock: Arc::new(ManualClock::starting_at(epoch())),
        }
    }

    pub fn reconciler(&self) -> TestReconciler {
        self.reconciler_with(TaskStatusConfig::default())
    }

    pub fn reconciler_with(&self, config: TaskStatusConfig) -> TestReconciler {
        TaskReconciler::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.backend),
            Arc::clone(&self.clock),
            config,
        )
    }

    pub fn owner_service(&self) -> TestOwnerService {
        OwnerTaskService::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.backend),
            Arc::clone(&self.clock),
        )
    }

    pub fn hooks(&self) -> TestHooks {
        TaskLifecycleHooks::new(Arc::clone(&self.repository), Arc::clone(&self.clock))
    }

    /// Stores a record created `age` before the current clock time.
    pub async fn seed(
        &self,
        id: &str,
        owner: &OwnerRef,
        state: TaskMetaState,
        age: TimeDelta,
    ) -> TaskRecord {
        let created_at = self.clock.utc() - age;
        self.seed_at(id, owner, state, created_at, created_at).await
    }

    /// Stores a record with explicit timestamps.
    pub async fn seed_at(
        &self,
        id: &str,
        owner: &OwnerRef,
        state: TaskMetaState,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> TaskRecord {
        let record = TaskRecord::from_persisted(PersistedTaskRecordData {
            task_id: task_id(id),
            owner: owner.clone(),
            task_name: format!("job-{id}"),
            state,
            created_at,
            updated_at,
            ui_block: false,
        });
        self.repository
            .insert(&record)
            .await
            .expect("seed record should insert");
        record
    }

    pub async fn stored(&self, id: &str) -> Option<TaskRecord> {
        self.repository
            .find_by_task_id(&task_id(id))
            .await
            .expect("lookup should succeed")
    }
}

#[fixture]
pub fn harness() -> Harness {
    Harness::new()
}

#[fixture]
pub fn invoice() -> OwnerRef {
    owner("invoice", 7)
}
