//! Given steps for task status BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::given;
use taskwatch::task::{
    domain::{ALL_TASK_STATES, OwnerRef, PersistedTaskRecordData, TaskId, TaskOutcome, TaskRecord},
    ports::TaskRecordRepository,
};

#[given(r#"a registered owner "{kind}" {id:u64}"#)]
fn registered_owner(world: &mut TaskStatusWorld, kind: String, id: u64) -> Result<(), eyre::Report> {
    let owner = OwnerRef::from_parts(kind, id)?;
    world.owners.register(owner.clone(), owner.to_string())?;
    world.owner = Some(owner);
    Ok(())
}

#[given(r#"a "{state}" task "{id}" submitted {seconds:u64} seconds ago"#)]
fn tracked_task(
    world: &mut TaskStatusWorld,
    state: String,
    id: String,
    seconds: u64,
) -> Result<(), eyre::Report> {
    let parsed_state = ALL_TASK_STATES
        .into_iter()
        .find(|candidate| candidate.as_str() == state)
        .ok_or_else(|| eyre::eyre!("invalid state in scenario: {state}"))?;
    let created_at = world.clock.utc() - TimeDelta::seconds(i64::try_from(seconds)?);
    let record = TaskRecord::from_persisted(PersistedTaskRecordData {
        task_id: TaskId::new(id.as_str())?,
        owner: world.owner()?.clone(),
        task_name: format!("scenario-{id}"),
        state: parsed_state,
        created_at,
        updated_at: created_at,
        ui_block: false,
    });
    run_async(world.repository.insert(&record)).wrap_err("seed task record")?;
    Ok(())
}

#[given(r#"the backend reports "{state}" for task "{id}""#)]
fn backend_reports(world: &mut TaskStatusWorld, state: String, id: String) -> Result<(), eyre::Report> {
    world.backend.set_state(&TaskId::new(id)?, state)?;
    Ok(())
}

#[given(r#"the backend holds the error "{message}" for task "{id}""#)]
fn backend_holds_error(
    world: &mut TaskStatusWorld,
    message: String,
    id: String,
) -> Result<(), eyre::Report> {
    world
        .backend
        .complete(&TaskId::new(id)?, TaskOutcome::Error(message))?;
    Ok(())
}

#[given(r#"the backend cannot read task "{id}""#)]
fn backend_cannot_read_state(world: &mut TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    world
        .backend
        .break_state(&TaskId::new(id)?, "undecodable state payload")?;
    Ok(())
}

#[given(r#"the backend cannot read the result of task "{id}""#)]
fn backend_cannot_read_result(world: &mut TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    world
        .backend
        .break_result(&TaskId::new(id)?, "undecodable result payload")?;
    Ok(())
}
