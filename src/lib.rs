//! Taskwatch: background task tracking for domain records.
//!
//! This crate mirrors the lifecycle of jobs run by an external task backend
//! in a local store keyed by the domain record ("owner") each job was
//! submitted for. It keeps that mirror in step with backend lifecycle
//! events and reconciles it on demand, so callers can ask whether an owner
//! is busy, what its last task returned, and whether the interface should
//! block while a task runs.
//!
//! # Architecture
//!
//! Taskwatch follows hexagonal architecture principles:
//!
//! - **Domain**: Pure task state model with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the record store, the task
//!   backend, worker inspection and owner resolution
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`task`]: Task records, reconciliation, lifecycle hooks and status
//!   services

pub mod task;
