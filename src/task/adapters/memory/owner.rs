//! In-memory owner registry and worker inspector.

use crate::task::{
    domain::OwnerRef,
    ports::{OwnerRegistry, OwnerRegistryError, WorkerInspector, WorkerInspectorError},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of known owners keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOwnerRegistry {
    owners: Arc<RwLock<HashMap<OwnerRef, String>>>,
}

impl InMemoryOwnerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an owner with a display label, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`OwnerRegistryError::Lookup`] when lock acquisition fails.
    pub fn register(
        &self,
        owner: OwnerRef,
        label: impl Into<String>,
    ) -> Result<(), OwnerRegistryError> {
        let mut owners = self.owners.write().map_err(poisoned)?;
        owners.insert(owner, label.into());
        Ok(())
    }
}

fn poisoned<T>(err: PoisonError<T>) -> OwnerRegistryError {
    OwnerRegistryError::lookup(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl OwnerRegistry for InMemoryOwnerRegistry {
    async fn resolve(&self, owner: &OwnerRef) -> Result<Option<String>, OwnerRegistryError> {
        let owners = self.owners.read().map_err(poisoned)?;
        Ok(owners.get(owner).cloned())
    }
}

/// Worker inspector returning a fixed answer.
#[derive(Debug, Clone)]
pub struct InMemoryWorkerInspector {
    answer: Result<Vec<String>, WorkerInspectorError>,
}

impl InMemoryWorkerInspector {
    /// Reports the given workers as active.
    #[must_use]
    pub fn with_workers(workers: impl IntoIterator<Item = String>) -> Self {
        Self {
            answer: Ok(workers.into_iter().collect()),
        }
    }

    /// Fails every inspection with the given error.
    #[must_use]
    pub const fn failing(error: WorkerInspectorError) -> Self {
        Self { answer: Err(error) }
    }
}

#[async_trait]
impl WorkerInspector for InMemoryWorkerInspector {
    async fn active_workers(&self) -> Result<Vec<String>, WorkerInspectorError> {
        self.answer.clone()
    }
}
