//! Worker pool availability probe.

use crate::task::{
    domain::{WorkerAvailability, WorkerStatus},
    ports::{WorkerInspector, WorkerInspectorError},
};
use std::sync::Arc;
use tracing::warn;

/// Reports whether any backend worker is online.
#[derive(Clone)]
pub struct WorkerStatusProbe<I>
where
    I: WorkerInspector,
{
    inspector: Arc<I>,
}

impl<I> WorkerStatusProbe<I>
where
    I: WorkerInspector,
{
    /// Creates a probe over the given inspector.
    #[must_use]
    pub const fn new(inspector: Arc<I>) -> Self {
        Self { inspector }
    }

    /// Inspects the worker pool.
    pub async fn probe(&self) -> WorkerAvailability {
        match self.inspector.active_workers().await {
            Ok(workers) if workers.is_empty() => WorkerAvailability::new(
                WorkerStatus::Offline,
                Some("No running task workers were found.".to_owned()),
            ),
            Ok(_) => WorkerAvailability::new(WorkerStatus::Ready, None),
            Err(err) => {
                warn!(error = %err, "worker inspection failed");
                unavailable(&err)
            }
        }
    }
}

fn unavailable(err: &WorkerInspectorError) -> WorkerAvailability {
    match err {
        WorkerInspectorError::ConnectionRefused(detail) => WorkerAvailability::new(
            WorkerStatus::Offline,
            Some(format!(
                "Error connecting to the backend: {detail} Check that the message broker is running."
            )),
        ),
        WorkerInspectorError::Io(detail) => WorkerAvailability::new(
            WorkerStatus::Offline,
            Some(format!("Error connecting to the backend: {detail}")),
        ),
        WorkerInspectorError::Unavailable(detail) => {
            WorkerAvailability::new(WorkerStatus::Error, Some(detail.clone()))
        }
    }
}
