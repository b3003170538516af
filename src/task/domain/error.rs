//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is empty after trimming.
    #[error("task identifier must not be empty")]
    EmptyTaskId,

    /// The owner kind tag is empty or contains whitespace.
    #[error("invalid owner kind '{0}', expected a non-empty tag without whitespace")]
    InvalidOwnerKind(String),

    /// The owner identifier is zero.
    #[error("invalid owner identifier {0}, expected a positive integer")]
    InvalidOwnerId(u64),
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
