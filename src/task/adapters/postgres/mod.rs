//! `PostgreSQL` adapters for task record persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTaskRecordRepository, TaskPgPool};
