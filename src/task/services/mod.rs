//! Application services for task tracking orchestration.

mod error;
mod hooks;
mod reconcile;
mod status;
mod submission;
mod workers;

pub use error::{TaskTrackingError, TaskTrackingResult};
pub use hooks::{TaskEvent, TaskEventListener, TaskLifecycleHooks};
pub use reconcile::{ReconcileReport, Reconciliation, TaskReconciler};
pub use status::{TaskStatusError, TaskStatusResponse, TaskStatusService};
pub use submission::{OwnerTaskService, READY_LABEL, RUNNING_LABEL, SubmitTaskRequest};
pub use workers::WorkerStatusProbe;
