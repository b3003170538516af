//! Reconciliation of locally tracked task state against the task backend.

use super::{TaskTrackingError, TaskTrackingResult};
use crate::task::{
    config::{ReconcileOptions, TaskStatusConfig},
    domain::{
        OwnerRef, ReadyTaskSummary, RunningTaskSummary, TaskMetaState, TaskRecord,
        TaskStateGroup, TaskStatusSnapshot,
    },
    ports::{TaskBackend, TaskBackendError, TaskRecordOrder, TaskRecordQuery, TaskRecordRepository},
};
use chrono::TimeDelta;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Counters describing what one reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Stale ready and skipped records deleted.
    pub garbage_removed: u64,
    /// Records deleted because the backend could not report their state.
    pub broken_forgotten: u64,
    /// Records whose stored state was corrected from the backend.
    pub drift_corrected: u64,
    /// Pending records deleted after the pending timeout.
    pub expired_pending: u64,
    /// Started records promoted to UI-blocking.
    pub ui_blocked: u64,
}

/// Snapshot and change report produced by [`TaskReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Consolidated status of the owner after the pass.
    pub snapshot: TaskStatusSnapshot,
    /// Changes applied during the pass.
    pub report: ReconcileReport,
}

/// Reconciles an owner's task records with live backend state.
///
/// One pass runs three steps:
///
/// 1. ready records other than the most recently updated one, and all
///    skipped records, are deleted;
/// 2. each running record is compared with the backend: unreadable records
///    are forgotten and deleted, drifted states are corrected, pending
///    records past the pending timeout are deleted and long-running started
///    records are flagged as UI-blocking;
/// 3. the snapshot is assembled from the current running task and the last
///    ready task.
#[derive(Clone)]
pub struct TaskReconciler<R, B, C>
where
    R: TaskRecordRepository,
    B: TaskBackend,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    backend: Arc<B>,
    clock: Arc<C>,
    config: TaskStatusConfig,
}

impl<R, B, C> TaskReconciler<R, B, C>
where
    R: TaskRecordRepository,
    B: TaskBackend,
    C: Clock + Send + Sync,
{
    /// Creates a reconciler with the given thresholds.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        backend: Arc<B>,
        clock: Arc<C>,
        config: TaskStatusConfig,
    ) -> Self {
        Self {
            repository,
            backend,
            clock,
            config,
        }
    }

    /// Returns the configured thresholds.
    #[must_use]
    pub const fn config(&self) -> TaskStatusConfig {
        self.config
    }

    /// Runs a full reconciliation pass for one owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails and
    /// [`TaskTrackingError::Backend`] when the last ready task's result
    /// cannot be fetched. Backend state query failures are recovered and
    /// never returned.
    pub async fn reconcile(
        &self,
        owner: &OwnerRef,
        options: ReconcileOptions,
    ) -> TaskTrackingResult<Reconciliation> {
        let config = self.config.with_overrides(options);
        let mut report = ReconcileReport {
            garbage_removed: self.collect_garbage(owner).await?,
            ..ReconcileReport::default()
        };

        let left_running = self.reconcile_running(owner, config, &mut report).await?;
        if left_running {
            report.garbage_removed += self.collect_garbage(owner).await?;
        }

        let snapshot = self.snapshot(owner).await?;
        debug!(
            owner = %owner,
            status = snapshot.status.as_str(),
            ?report,
            "task status reconciled"
        );
        Ok(Reconciliation { snapshot, report })
    }

    /// Deletes every ready record except the most recently updated one, and
    /// every skipped record. Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails.
    pub async fn collect_garbage(&self, owner: &OwnerRef) -> TaskTrackingResult<u64> {
        let ready = TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Ready);
        let mut removed = 0;
        if let Some(last_ready) = self
            .repository
            .first(&ready, TaskRecordOrder::LastUpdated)
            .await?
        {
            removed += self
                .repository
                .delete(&ready.excluding(last_ready.task_id().clone()))
                .await?;
        }

        let skipped = TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Skipped);
        removed += self.repository.delete(&skipped).await?;

        if removed > 0 {
            info!(owner = %owner, removed, "removed stale task records");
        }
        Ok(removed)
    }

    /// Assembles the status snapshot of an owner without reconciling.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTrackingError::Repository`] when the store fails and
    /// [`TaskTrackingError::Backend`] when the last ready task's result
    /// cannot be fetched.
    pub async fn snapshot(&self, owner: &OwnerRef) -> TaskTrackingResult<TaskStatusSnapshot> {
        let running = self
            .repository
            .first(
                &TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Running),
                TaskRecordOrder::Newest,
            )
            .await?;
        let now = self.clock.utc();
        let running_task = running
            .as_ref()
            .map(|record| RunningTaskSummary::from_record(record, now));

        let last_ready = self
            .repository
            .first(
                &TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Ready),
                TaskRecordOrder::LastUpdated,
            )
            .await?;
        let Some(record) = last_ready else {
            return Ok(TaskStatusSnapshot::new(running_task, None));
        };
        let outcome = self.backend.result(record.task_id()).await?;
        Ok(TaskStatusSnapshot::new(
            running_task,
            Some(ReadyTaskSummary::from_record(&record, &outcome)),
        ))
    }

    /// Reconciles each running record; returns `true` when any record moved
    /// into the ready or skipped group.
    async fn reconcile_running(
        &self,
        owner: &OwnerRef,
        config: TaskStatusConfig,
        report: &mut ReconcileReport,
    ) -> TaskTrackingResult<bool> {
        let running = self
            .repository
            .find(&TaskRecordQuery::for_owner(owner.clone()).with_state(TaskStateGroup::Running))
            .await?;
        let pending_timeout = to_time_delta(config.pending_task_timeout);
        let non_block_ui_timeout = to_time_delta(config.non_block_ui_timeout);
        let mut left_running = false;

        for record in running {
            let raw_state = match self.backend.state(record.task_id()).await {
                Ok(raw_state) => raw_state,
                Err(err) => {
                    self.discard_broken(owner, &record, &err).await?;
                    report.broken_forgotten += 1;
                    continue;
                }
            };

            let state = self.correct_drift(owner, &record, &raw_state, report).await?;
            left_running |= !state.is_running();

            let elapsed = record.elapsed_at(self.clock.utc());
            if state == TaskMetaState::Pending && elapsed > pending_timeout {
                self.repository
                    .delete(&TaskRecordQuery::for_task(record.task_id().clone()))
                    .await?;
                report.expired_pending += 1;
                warn!(
                    owner = %owner,
                    task_id = %record.task_id(),
                    elapsed_secs = elapsed.num_seconds(),
                    "pending task exceeded timeout; record deleted"
                );
            } else if !record.ui_block()
                && state == TaskMetaState::Started
                && elapsed > non_block_ui_timeout
            {
                self.repository.block_ui(record.task_id()).await?;
                report.ui_blocked += 1;
                warn!(
                    owner = %owner,
                    task_id = %record.task_id(),
                    elapsed_secs = elapsed.num_seconds(),
                    "started task is now blocking the UI"
                );
            }
        }
        Ok(left_running)
    }

    /// Overwrites the stored state when the backend disagrees and returns
    /// the effective state.
    async fn correct_drift(
        &self,
        owner: &OwnerRef,
        record: &TaskRecord,
        raw_state: &str,
        report: &mut ReconcileReport,
    ) -> TaskTrackingResult<TaskMetaState> {
        let backend_state = TaskMetaState::classify(raw_state);
        if backend_state == record.state() {
            return Ok(backend_state);
        }
        self.repository
            .update_state(record.task_id(), backend_state, self.clock.utc())
            .await?;
        report.drift_corrected += 1;
        warn!(
            owner = %owner,
            task_id = %record.task_id(),
            stored = %record.state(),
            backend = raw_state,
            "task state drifted from backend; record corrected"
        );
        Ok(backend_state)
    }

    /// Forgets the backend result of an unreadable task and deletes its
    /// record.
    async fn discard_broken(
        &self,
        owner: &OwnerRef,
        record: &TaskRecord,
        cause: &TaskBackendError,
    ) -> Result<(), TaskTrackingError> {
        if let Err(forget_err) = self.backend.forget(record.task_id()).await {
            warn!(
                task_id = %record.task_id(),
                error = %forget_err,
                "failed to forget broken task result"
            );
        }
        self.repository
            .delete(&TaskRecordQuery::for_task(record.task_id().clone()))
            .await?;
        error!(
            owner = %owner,
            task_id = %record.task_id(),
            error = %cause,
            "task backend state unreadable; record forgotten and deleted"
        );
        Ok(())
    }
}

fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}
