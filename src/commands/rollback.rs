// ABOUTME: Rollback command implementation.
// ABOUTME: Runs the deployer's rollback task on the selected group.

use super::tasks::execute;
use cutover::error::Result;
use cutover::output::Output;
use cutover::tasks::{Group, Registry, TaskSet};

/// Roll every server of `group` back to its previous release.
pub async fn rollback(group: Group, output: Output) -> Result<()> {
    let registry = Registry::builtin();
    let set = TaskSet::install(&registry, &group);
    let task = set.find("deployer", "rollback")?;

    execute(task, &registry, &group, output).await
}
