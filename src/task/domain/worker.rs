//! Availability of the workers executing tasks.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Coarse status of the backend worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerStatus {
    /// No worker answered.
    Offline,
    /// At least one worker is online.
    Ready,
    /// Workers are online but saturated.
    Busy,
    /// The worker pool could not be inspected at all.
    Error,
}

impl WorkerStatus {
    /// Returns the stable numeric status code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Offline => 0,
            Self::Ready => 1,
            Self::Busy => 2,
            Self::Error => 3,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Ready => "ready",
            Self::Busy => "busy",
            Self::Error => "error",
        }
    }

    /// Returns `true` for statuses that mean tasks cannot run.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Offline | Self::Error)
    }
}

/// Result of probing the worker pool.
///
/// Serializes as `{"status_code", "status", "status_message"?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerAvailability {
    status: WorkerStatus,
    status_message: Option<String>,
}

impl WorkerAvailability {
    /// Creates an availability report.
    #[must_use]
    pub const fn new(status: WorkerStatus, status_message: Option<String>) -> Self {
        Self {
            status,
            status_message,
        }
    }

    /// Returns the reported status.
    #[must_use]
    pub const fn status(&self) -> WorkerStatus {
        self.status
    }

    /// Returns the diagnostic message, if any.
    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

impl Serialize for WorkerAvailability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.status_message.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("WorkerAvailability", field_count)?;
        state.serialize_field("status_code", &self.status.code())?;
        state.serialize_field("status", self.status.as_str())?;
        if let Some(message) = &self.status_message {
            state.serialize_field("status_message", message)?;
        }
        state.end()
    }
}
