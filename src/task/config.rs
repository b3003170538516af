//! Reconciliation thresholds.

use std::time::Duration;
use tracing::warn;

/// Environment variable overriding [`TaskStatusConfig::pending_task_timeout`].
pub const PENDING_TASK_TIMEOUT_ENV: &str = "TASKWATCH_PENDING_TASK_TIMEOUT";

/// Environment variable overriding [`TaskStatusConfig::non_block_ui_timeout`].
pub const NON_BLOCK_UI_TIMEOUT_ENV: &str = "TASKWATCH_NON_BLOCK_UI_TIMEOUT";

const DEFAULT_PENDING_TASK_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const DEFAULT_NON_BLOCK_UI_TIMEOUT: Duration = Duration::from_secs(60);

/// Thresholds applied when reconciling an owner's tasks.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `TASKWATCH_PENDING_TASK_TIMEOUT` | `600` | Seconds a task may stay pending before it is purged |
/// | `TASKWATCH_NON_BLOCK_UI_TIMEOUT` | `60` | Seconds a started task runs before it blocks the UI |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taskwatch::task::config::TaskStatusConfig;
///
/// let config = TaskStatusConfig::default();
/// assert_eq!(config.pending_task_timeout, Duration::from_secs(600));
/// assert_eq!(config.non_block_ui_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStatusConfig {
    /// Age after which a task still pending is presumed abandoned.
    pub pending_task_timeout: Duration,
    /// Age after which a started task is flagged as UI-blocking.
    pub non_block_ui_timeout: Duration,
}

impl Default for TaskStatusConfig {
    fn default() -> Self {
        Self {
            pending_task_timeout: DEFAULT_PENDING_TASK_TIMEOUT,
            non_block_ui_timeout: DEFAULT_NON_BLOCK_UI_TIMEOUT,
        }
    }
}

impl TaskStatusConfig {
    /// Creates configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates configuration from an arbitrary variable lookup.
    ///
    /// Missing, unparsable or zero values fall back to the defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            pending_task_timeout: seconds_or_default(
                &lookup,
                PENDING_TASK_TIMEOUT_ENV,
                DEFAULT_PENDING_TASK_TIMEOUT,
            ),
            non_block_ui_timeout: seconds_or_default(
                &lookup,
                NON_BLOCK_UI_TIMEOUT_ENV,
                DEFAULT_NON_BLOCK_UI_TIMEOUT,
            ),
        }
    }

    /// Applies per-call overrides on top of this configuration.
    #[must_use]
    pub fn with_overrides(self, options: ReconcileOptions) -> Self {
        Self {
            pending_task_timeout: options
                .pending_task_timeout
                .filter(|timeout| !timeout.is_zero())
                .unwrap_or(self.pending_task_timeout),
            non_block_ui_timeout: options
                .non_block_ui_timeout
                .filter(|timeout| !timeout.is_zero())
                .unwrap_or(self.non_block_ui_timeout),
        }
    }
}

/// Per-call threshold overrides.
///
/// Absent or zero values defer to the service configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Override for [`TaskStatusConfig::pending_task_timeout`].
    pub pending_task_timeout: Option<Duration>,
    /// Override for [`TaskStatusConfig::non_block_ui_timeout`].
    pub non_block_ui_timeout: Option<Duration>,
}

impl ReconcileOptions {
    /// Sets the pending timeout override.
    #[must_use]
    pub const fn with_pending_task_timeout(mut self, timeout: Duration) -> Self {
        self.pending_task_timeout = Some(timeout);
        self
    }

    /// Sets the UI-blocking timeout override.
    #[must_use]
    pub const fn with_non_block_ui_timeout(mut self, timeout: Duration) -> Self {
        self.non_block_ui_timeout = Some(timeout);
        self
    }
}

fn seconds_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Duration,
) -> Duration {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Duration::from_secs(seconds),
        _ => {
            warn!(
                env_var = name,
                value = %raw,
                default_secs = default.as_secs(),
                "invalid timeout value, using default"
            );
            default
        }
    }
}
