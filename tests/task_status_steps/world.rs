//! Shared world state for task status BDD scenarios.

use std::sync::Arc;

use crate::test_helpers::{SteppingClock, init_tracing};
use rstest::fixture;
use serde_json::Value;
use taskwatch::task::{
    adapters::memory::{InMemoryOwnerRegistry, InMemoryTaskBackend, InMemoryTaskRecordRepository},
    config::TaskStatusConfig,
    domain::{OwnerRef, TaskId, TaskRecord},
    ports::TaskRecordRepository,
    services::{TaskLifecycleHooks, TaskReconciler, TaskStatusService},
};

/// Status service type used by the BDD world.
pub type TestStatusService = TaskStatusService<
    InMemoryTaskRecordRepository,
    InMemoryTaskBackend,
    SteppingClock,
    InMemoryOwnerRegistry,
>;

/// Scenario world for task status behaviour tests.
pub struct TaskStatusWorld {
    pub repository: Arc<InMemoryTaskRecordRepository>,
    pub backend: Arc<InMemoryTaskBackend>,
    pub owners: Arc<InMemoryOwnerRegistry>,
    pub clock: Arc<SteppingClock>,
    pub owner: Option<OwnerRef>,
    pub document: Option<Value>,
}

impl TaskStatusWorld {
    /// Creates a world with empty adapters.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        Self {
            repository: Arc::new(InMemoryTaskRecordRepository::new()),
            backend: Arc::new(InMemoryTaskBackend::new()),
            owners: Arc::new(InMemoryOwnerRegistry::new()),
            clock: Arc::new(SteppingClock::new()),
            owner: None,
            document: None,
        }
    }

    /// Builds a status service over the world's adapters.
    pub fn status_service(&self) -> TestStatusService {
        let reconciler = TaskReconciler::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.backend),
            Arc::clone(&self.clock),
            TaskStatusConfig::default(),
        );
        TaskStatusService::new(reconciler, Arc::clone(&self.owners))
    }

    /// Builds lifecycle hooks over the world's repository.
    pub fn hooks(&self) -> TaskLifecycleHooks<InMemoryTaskRecordRepository, SteppingClock> {
        TaskLifecycleHooks::new(Arc::clone(&self.repository), Arc::clone(&self.clock))
    }

    /// Returns the scenario owner.
    ///
    /// # Errors
    ///
    /// Returns an error when no owner has been registered.
    pub fn owner(&self) -> Result<&OwnerRef, eyre::Report> {
        self.owner
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing owner in scenario world"))
    }

    /// Returns the last status document.
    ///
    /// # Errors
    ///
    /// Returns an error when no status has been requested.
    pub fn document(&self) -> Result<&Value, eyre::Report> {
        self.document
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing status document in scenario world"))
    }

    /// Looks up a tracked record.
    ///
    /// # Errors
    ///
    /// Returns an error when the identifier is invalid or the lookup fails.
    pub fn stored(&self, id: &str) -> Result<Option<TaskRecord>, eyre::Report> {
        let task_id = TaskId::new(id)?;
        Ok(run_async(self.repository.find_by_task_id(&task_id))?)
    }
}

impl Default for TaskStatusWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStatusWorld {
    TaskStatusWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
