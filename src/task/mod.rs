//! Background task tracking for domain records.
//!
//! This module mirrors the state of jobs run by an external task backend in
//! a local store keyed by owner, keeps that mirror in step with backend
//! lifecycle events, and reconciles it on demand into a status snapshot
//! that tells callers whether an owner is busy and what its last task
//! returned. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Reconciliation thresholds in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
