//! Shared test helpers for in-memory task tracking integration tests.

use crate::test_helpers::{SteppingClock, init_tracing};
use rstest::fixture;
use std::sync::Arc;
use taskwatch::task::{
    adapters::memory::{InMemoryOwnerRegistry, InMemoryTaskBackend, InMemoryTaskRecordRepository},
    config::TaskStatusConfig,
    domain::{OwnerRef, TaskId},
    services::{OwnerTaskService, TaskLifecycleHooks, TaskReconciler, TaskStatusService},
};

/// Owner service wired to in-memory adapters.
pub type OwnerService =
    OwnerTaskService<InMemoryTaskRecordRepository, InMemoryTaskBackend, SteppingClock>;

/// Status service wired to in-memory adapters.
pub type StatusService = TaskStatusService<
    InMemoryTaskRecordRepository,
    InMemoryTaskBackend,
    SteppingClock,
    InMemoryOwnerRegistry,
>;

/// Lifecycle hooks wired to the in-memory repository.
pub type Hooks = TaskLifecycleHooks<InMemoryTaskRecordRepository, SteppingClock>;

/// In-memory adapters and services sharing one clock.
pub struct TaskTrackingContext {
    pub repository: Arc<InMemoryTaskRecordRepository>,
    pub backend: Arc<InMemoryTaskBackend>,
    pub owners: Arc<InMemoryOwnerRegistry>,
    pub clock: Arc<SteppingClock>,
    pub owner_service: OwnerService,
    pub status_service: StatusService,
    pub hooks: Hooks,
}

/// Provides a fresh context for each test.
#[fixture]
pub fn context() -> TaskTrackingContext {
    init_tracing();
    let repository = Arc::new(InMemoryTaskRecordRepository::new());
    let backend = Arc::new(InMemoryTaskBackend::new());
    let owners = Arc::new(InMemoryOwnerRegistry::new());
    let clock = Arc::new(SteppingClock::new());
    let reconciler = TaskReconciler::new(
        Arc::clone(&repository),
        Arc::clone(&backend),
        Arc::clone(&clock),
        TaskStatusConfig::default(),
    );
    TaskTrackingContext {
        owner_service: OwnerTaskService::new(
            Arc::clone(&repository),
            Arc::clone(&backend),
            Arc::clone(&clock),
        ),
        status_service: TaskStatusService::new(reconciler, Arc::clone(&owners)),
        hooks: TaskLifecycleHooks::new(Arc::clone(&repository), Arc::clone(&clock)),
        repository,
        backend,
        owners,
        clock,
    }
}

/// Builds an owner reference.
///
/// # Errors
///
/// Returns an error when the parts are invalid.
pub fn owner(kind: &str, id: u64) -> Result<OwnerRef, eyre::Report> {
    Ok(OwnerRef::from_parts(kind, id)?)
}

/// Builds a task identifier.
///
/// # Errors
///
/// Returns an error when the identifier is blank.
pub fn task_id(value: &str) -> Result<TaskId, eyre::Report> {
    Ok(TaskId::new(value)?)
}
