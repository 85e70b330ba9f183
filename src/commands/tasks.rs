// ABOUTME: Task listing and execution by name.
// ABOUTME: Also hosts the runner shared by the deploy and rollback commands.

use cutover::config::Config;
use cutover::diagnostics::Diagnostics;
use cutover::error::Result;
use cutover::output::Output;
use cutover::release::RollbackOutcome;
use cutover::tasks::{Group, Registry, Task, TaskError, TaskOutcome, TaskRun, TaskSet};
use serde_json::json;

/// Print every task name, for the top-level group and each destination.
pub fn list_tasks(config: &Config, output: &Output) -> Result<()> {
    let registry = Registry::builtin();
    let mut names = Vec::new();

    for group in Group::all(config)? {
        let set = TaskSet::install(&registry, &group);
        names.extend(set.names().map(str::to_string));
    }

    output.data("tasks", &names.join("\n"), &names);
    Ok(())
}

/// Run the task called `name`, looked up across every group.
pub async fn run_task(config: &Config, name: &str, output: Output) -> Result<()> {
    let registry = Registry::builtin();

    for group in Group::all(config)? {
        let set = TaskSet::install(&registry, &group);
        if let Some(task) = set.get(name) {
            return execute(task, &registry, &group, output).await;
        }
    }

    Err(TaskError::UnknownTask(name.to_string()).into())
}

/// Run `task` on `group` and report each target's outcome.
pub(super) async fn execute(
    task: &Task,
    registry: &Registry,
    group: &Group,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Running {} on {} server(s)",
        task.name,
        group.targets.len()
    ));

    let result = task.invoke(registry, group, &mut diag).await;

    // Emit collected warnings even when the task failed part way.
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    for run in result? {
        report(&output, &run);
    }

    output.success(&format!("{} complete", task.name));
    Ok(())
}

fn report(output: &Output, run: &TaskRun) {
    match &run.outcome {
        TaskOutcome::Deployed(report) => output.data(
            "deployed",
            &format!("  ✓ {}: release {} is live", run.host, report.release),
            &json!({ "host": run.host, "release": report.release.as_str() }),
        ),
        TaskOutcome::RolledBack(RollbackOutcome::RolledBack { from, to }) => output.data(
            "rolled_back",
            &format!("  ✓ {}: rolled back from {} to {}", run.host, from, to),
            &json!({ "host": run.host, "from": from.as_str(), "to": to.as_str() }),
        ),
        TaskOutcome::RolledBack(RollbackOutcome::NothingToRollBack) => output.data(
            "nothing_to_roll_back",
            &format!("  - {}: no release to roll back to", run.host),
            &json!({ "host": run.host }),
        ),
    }
}
