//! Port contracts for background task tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod backend;
pub mod inspector;
pub mod owner;
pub mod repository;

pub use backend::{TaskBackend, TaskBackendError, TaskBackendResult, TaskSubmission};
pub use inspector::{WorkerInspector, WorkerInspectorError};
pub use owner::{OwnerRegistry, OwnerRegistryError, TaskOwner};
pub use repository::{
    TaskRecordOrder, TaskRecordQuery, TaskRecordRepository, TaskRepositoryError,
    TaskRepositoryResult,
};

#[cfg(test)]
pub use backend::MockTaskBackend;
