//! Then steps for task status BDD scenarios.

use super::world::TaskStatusWorld;
use rstest_bdd_macros::then;

#[then(r#"the status is "{status}""#)]
fn status_is(world: &TaskStatusWorld, status: String) -> Result<(), eyre::Report> {
    let document = world.document()?;
    if document["status"] != status.as_str() {
        return Err(eyre::eyre!("expected status {status}, got {document}"));
    }
    Ok(())
}

#[then("no running task is reported")]
fn no_running_task(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let document = world.document()?;
    eyre::ensure!(
        document.get("running_task").is_none(),
        "unexpected running task in {document}"
    );
    Ok(())
}

#[then("no last ready task is reported")]
fn no_last_ready_task(world: &TaskStatusWorld) -> Result<(), eyre::Report> {
    let document = world.document()?;
    eyre::ensure!(
        document.get("last_ready_task").is_none(),
        "unexpected last ready task in {document}"
    );
    Ok(())
}

#[then(r#"the running task state is "{state}""#)]
fn running_task_state(world: &TaskStatusWorld, state: String) -> Result<(), eyre::Report> {
    let document = world.document()?;
    eyre::ensure!(
        document["running_task"]["state"] == state.as_str(),
        "expected running state {state}, got {document}"
    );
    Ok(())
}

#[then(r#"the last ready task is "{id}""#)]
fn last_ready_task_is(world: &TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    let document = world.document()?;
    eyre::ensure!(
        document["last_ready_task"]["task_id"] == id.as_str(),
        "expected last ready task {id}, got {document}"
    );
    Ok(())
}

#[then(r#"the last ready task error is "{message}""#)]
fn last_ready_task_error(world: &TaskStatusWorld, message: String) -> Result<(), eyre::Report> {
    let document = world.document()?;
    eyre::ensure!(
        document["last_ready_task"]["error_message"] == message.as_str(),
        "expected error {message}, got {document}"
    );
    Ok(())
}

#[then(r#"the error message mentions "{fragment}""#)]
fn error_message_mentions(world: &TaskStatusWorld, fragment: String) -> Result<(), eyre::Report> {
    let document = world.document()?;
    let message = document["error_message"]
        .as_str()
        .ok_or_else(|| eyre::eyre!("missing error message in {document}"))?;
    eyre::ensure!(
        message.contains(fragment.as_str()),
        "error message {message:?} does not mention {fragment:?}"
    );
    Ok(())
}

#[then(r#"task "{id}" blocks the interface"#)]
fn task_blocks_interface(world: &TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    let record = world
        .stored(&id)?
        .ok_or_else(|| eyre::eyre!("task {id} is not tracked"))?;
    eyre::ensure!(record.ui_block(), "task {id} should block the interface");
    Ok(())
}

#[then(r#"task "{id}" does not block the interface"#)]
fn task_does_not_block_interface(world: &TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    let record = world
        .stored(&id)?
        .ok_or_else(|| eyre::eyre!("task {id} is not tracked"))?;
    eyre::ensure!(!record.ui_block(), "task {id} should not block the interface");
    Ok(())
}

#[then(r#"task "{id}" is no longer tracked"#)]
fn task_not_tracked(world: &TaskStatusWorld, id: String) -> Result<(), eyre::Report> {
    eyre::ensure!(world.stored(&id)?.is_none(), "task {id} is still tracked");
    Ok(())
}
