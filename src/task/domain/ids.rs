//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Backend-assigned identifier of a submitted task.
///
/// Identifiers are opaque strings: callers may supply their own when
/// resubmitting, otherwise a random UUID is generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskId`] when the value is empty after
    /// trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyTaskId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type tag naming the kind of domain record that owns tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerKind(String);

impl OwnerKind {
    /// Creates a validated owner kind.
    ///
    /// Tags are trimmed and lowercased so `Invoice` and `invoice` name the
    /// same kind.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidOwnerKind`] when the tag is empty or
    /// contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
            return Err(TaskDomainError::InvalidOwnerKind(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the tag as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positive identifier of an owner record within its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Largest owner identifier representable in the current `PostgreSQL`
    /// schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Creates a validated owner identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidOwnerId`] when the value is zero or
    /// exceeds the schema-backed maximum (`i64::MAX`).
    pub const fn new(value: u64) -> Result<Self, TaskDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(TaskDomainError::InvalidOwnerId(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the domain record on whose behalf tasks are submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerRef {
    kind: OwnerKind,
    id: OwnerId,
}

impl OwnerRef {
    /// Creates an owner reference from validated parts.
    #[must_use]
    pub const fn new(kind: OwnerKind, id: OwnerId) -> Self {
        Self { kind, id }
    }

    /// Creates an owner reference from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when either part fails validation.
    pub fn from_parts(kind: impl Into<String>, id: u64) -> Result<Self, TaskDomainError> {
        Ok(Self::new(OwnerKind::new(kind)?, OwnerId::new(id)?))
    }

    /// Returns the owner kind.
    #[must_use]
    pub const fn kind(&self) -> &OwnerKind {
        &self.kind
    }

    /// Returns the owner identifier.
    #[must_use]
    pub const fn id(&self) -> OwnerId {
        self.id
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
