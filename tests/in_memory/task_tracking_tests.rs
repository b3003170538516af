//! In-memory integration tests for the task tracking flow.

use super::helpers::{TaskTrackingContext, context, owner, task_id};
use chrono::TimeDelta;
use rstest::rstest;
use serde_json::json;
use taskwatch::task::{
    config::ReconcileOptions,
    domain::{TaskMetaState, TaskOutcome},
    ports::{TaskRecordRepository, TaskOwner},
    services::{SubmitTaskRequest, TaskStatusError},
};

struct Invoice {
    id: u64,
}

impl TaskOwner for Invoice {
    const KIND: &'static str = "invoice";

    fn owner_id(&self) -> u64 {
        self.id
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_task_runs_to_completion(
    context: TaskTrackingContext,
) -> Result<(), eyre::Report> {
    let invoice = Invoice { id: 41 }.owner_ref()?;
    context.owners.register(invoice.clone(), "Invoice #41")?;

    let handle = context
        .owner_service
        .submit(&invoice, SubmitTaskRequest::new("render_pdf", json!({"copies": 1})))
        .await?;
    let task = handle.task_id().clone();

    context.clock.advance(TimeDelta::seconds(2));
    context.hooks.on_start(&task).await;
    context.backend.set_state(&task, "STARTED")?;
    let busy = context
        .status_service
        .task_status(&invoice, ReconcileOptions::default())
        .await?
        .to_document();
    eyre::ensure!(busy["status"] == "busy", "expected busy, got {busy}");
    eyre::ensure!(busy["running_task"]["state"] == "STARTED", "unexpected running task: {busy}");

    context.clock.advance(TimeDelta::seconds(3));
    context
        .backend
        .complete(&task, TaskOutcome::Value(json!("invoice.pdf")))?;
    context.hooks.on_finish(&task, Some("SUCCESS")).await;
    let ready = context
        .status_service
        .task_status(&invoice, ReconcileOptions::default())
        .await?
        .to_document();

    eyre::ensure!(ready["status"] == "ready", "expected ready, got {ready}");
    eyre::ensure!(ready.get("running_task").is_none(), "running task still reported");
    eyre::ensure!(
        ready["last_ready_task"]["result"] == "invoice.pdf",
        "unexpected result: {ready}"
    );
    eyre::ensure!(
        ready["last_ready_task"]["execution_time"] == 5_000,
        "unexpected execution time: {ready}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resubmitting_with_same_id_replaces_previous_result(
    context: TaskTrackingContext,
) -> Result<(), eyre::Report> {
    let invoice = owner("invoice", 5)?;
    let fixed = task_id("nightly-export")?;
    context
        .owner_service
        .submit(
            &invoice,
            SubmitTaskRequest::new("export", json!({})).with_task_id(fixed.clone()),
        )
        .await?;
    context
        .backend
        .complete(&fixed, TaskOutcome::Error("timeout".to_owned()))?;
    context.hooks.on_finish(&fixed, Some("FAILURE")).await;

    context
        .owner_service
        .submit(
            &invoice,
            SubmitTaskRequest::new("export", json!({"retry": true})).with_task_id(fixed.clone()),
        )
        .await?;

    let record = context
        .repository
        .find_by_task_id(&fixed)
        .await?
        .ok_or_else(|| eyre::eyre!("record should exist"))?;
    eyre::ensure!(record.state() == TaskMetaState::Pending, "state not reset");
    eyre::ensure!(
        context.backend.forgotten()? == vec![fixed.clone()],
        "stale result should be forgotten once"
    );
    eyre::ensure!(context.backend.submissions()?.len() == 2, "expected two submissions");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_of_unregistered_owner_is_not_found(
    context: TaskTrackingContext,
) -> Result<(), eyre::Report> {
    let stranger = owner("invoice", 404)?;

    let result = context
        .status_service
        .task_status(&stranger, ReconcileOptions::default())
        .await;

    eyre::ensure!(
        result == Err(TaskStatusError::OwnerNotFound(stranger)),
        "expected owner not found, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn abandoned_submission_expires_after_pending_timeout(
    context: TaskTrackingContext,
) -> Result<(), eyre::Report> {
    let invoice = owner("invoice", 6)?;
    context.owners.register(invoice.clone(), "Invoice #6")?;
    let handle = context
        .owner_service
        .submit(&invoice, SubmitTaskRequest::new("render_pdf", json!(null)))
        .await?;

    context.clock.advance(TimeDelta::seconds(601));
    let document = context
        .status_service
        .task_status(&invoice, ReconcileOptions::default())
        .await?
        .to_document();

    eyre::ensure!(document == json!({"status": "ready"}), "unexpected document {document}");
    eyre::ensure!(
        context.repository.find_by_task_id(handle.task_id()).await?.is_none(),
        "expired record should be deleted"
    );
    eyre::ensure!(
        !context.owner_service.has_running_task(&invoice).await?,
        "owner should be idle"
    );
    Ok(())
}
