//! Worker inspection port.

use async_trait::async_trait;
use std::io;
use thiserror::Error;

/// Lists the workers currently consuming tasks.
#[async_trait]
pub trait WorkerInspector: Send + Sync {
    /// Returns the names of the workers that answered.
    async fn active_workers(&self) -> Result<Vec<String>, WorkerInspectorError>;
}

/// Errors returned by worker inspector adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerInspectorError {
    /// The message broker refused the connection.
    #[error("{0}")]
    ConnectionRefused(String),

    /// Any other I/O failure while contacting the broker.
    #[error("{0}")]
    Io(String),

    /// No inspector is available in this deployment.
    #[error("{0}")]
    Unavailable(String),
}

impl From<io::Error> for WorkerInspectorError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}
