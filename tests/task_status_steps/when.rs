//! When steps for task status BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskwatch::task::{config::ReconcileOptions, domain::TaskId};

#[when("the task status is requested")]
fn request_task_status(world: &mut TaskStatusWorld) -> Result<(), eyre::Report> {
    let owner = world.owner()?.clone();
    let response = run_async(
        world
            .status_service()
            .task_status(&owner, ReconcileOptions::default()),
    )
    .wrap_err("request task status")?;
    world.document = Some(response.to_document());
    Ok(())
}

#[when(r#"task "{id}" is revoked"#)]
fn revoke_task(world: &mut TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    let task_id = TaskId::new(id)?;
    run_async(world.hooks().on_revoke(&task_id));
    Ok(())
}
