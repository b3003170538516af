//! In-memory adapters for task tracking tests and local deterministic flows.

mod backend;
mod owner;
mod repository;

pub use backend::InMemoryTaskBackend;
pub use owner::{InMemoryOwnerRegistry, InMemoryWorkerInspector};
pub use repository::InMemoryTaskRecordRepository;
