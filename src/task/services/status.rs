//! Status endpoint boundary: owner resolution and failure conversion.

use super::{Reconciliation, TaskReconciler};
use crate::task::{
    config::ReconcileOptions,
    domain::{OwnerRef, TaskStatusSnapshot},
    ports::{OwnerRegistry, TaskBackend, TaskRecordRepository},
};
use mockable::Clock;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Document returned by the task status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatusResponse {
    /// Reconciliation succeeded.
    Snapshot(TaskStatusSnapshot),
    /// Reconciliation failed; serialized with `status = "error"`.
    Error {
        /// Human-readable failure description.
        error_message: String,
    },
}

impl TaskStatusResponse {
    /// Returns `true` for the error form.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns the snapshot when reconciliation succeeded.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&TaskStatusSnapshot> {
        match self {
            Self::Snapshot(snapshot) => Some(snapshot),
            Self::Error { .. } => None,
        }
    }

    /// Renders the response as a JSON document.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskwatch::task::services::TaskStatusResponse;
    ///
    /// let response = TaskStatusResponse::Error {
    ///     error_message: "backend offline".to_owned(),
    /// };
    /// assert_eq!(response.to_document()["status"], "error");
    /// ```
    #[must_use]
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|err| {
            json!({ "status": "error", "error_message": err.to_string() })
        })
    }
}

impl Serialize for TaskStatusResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Snapshot(snapshot) => snapshot.serialize(serializer),
            Self::Error { error_message } => {
                let mut state = serializer.serialize_struct("TaskStatusResponse", 2)?;
                state.serialize_field("status", "error")?;
                state.serialize_field("error_message", error_message)?;
                state.end()
            }
        }
    }
}

/// Errors the status endpoint reports instead of a document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskStatusError {
    /// The owner reference does not resolve to a live record.
    #[error("owner not found: {0}")]
    OwnerNotFound(OwnerRef),
}

/// Task status endpoint service.
#[derive(Clone)]
pub struct TaskStatusService<R, B, C, O>
where
    R: TaskRecordRepository,
    B: TaskBackend,
    C: Clock + Send + Sync,
    O: OwnerRegistry,
{
    reconciler: TaskReconciler<R, B, C>,
    owners: Arc<O>,
}

impl<R, B, C, O> TaskStatusService<R, B, C, O>
where
    R: TaskRecordRepository,
    B: TaskBackend,
    C: Clock + Send + Sync,
    O: OwnerRegistry,
{
    /// Creates a status service delegating to the given reconciler.
    #[must_use]
    pub const fn new(reconciler: TaskReconciler<R, B, C>, owners: Arc<O>) -> Self {
        Self { reconciler, owners }
    }

    /// Reconciles the owner's tasks and returns the status document.
    ///
    /// Owner lookup and reconciliation failures are reported in the
    /// document, not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStatusError::OwnerNotFound`] when the owner does not
    /// resolve.
    pub async fn task_status(
        &self,
        owner: &OwnerRef,
        options: ReconcileOptions,
    ) -> Result<TaskStatusResponse, TaskStatusError> {
        let label = match self.owners.resolve(owner).await {
            Ok(Some(label)) => label,
            Ok(None) => {
                info!(owner = %owner, "task status requested for unknown owner");
                return Err(TaskStatusError::OwnerNotFound(owner.clone()));
            }
            Err(err) => {
                error!(owner = %owner, error = %err, "owner lookup failed");
                return Ok(TaskStatusResponse::Error {
                    error_message: err.to_string(),
                });
            }
        };

        match self.reconciler.reconcile(owner, options).await {
            Ok(Reconciliation { snapshot, .. }) => Ok(TaskStatusResponse::Snapshot(snapshot)),
            Err(err) => {
                error!(owner = %owner, label = %label, error = %err, "task status failed");
                Ok(TaskStatusResponse::Error {
                    error_message: err.to_string(),
                })
            }
        }
    }
}
