// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the deployer's deploy task on the selected group.

use super::tasks::execute;
use cutover::error::Result;
use cutover::output::Output;
use cutover::tasks::{Group, Registry, TaskSet};

/// Deploy a new release to every server of `group`.
pub async fn deploy(group: Group, output: Output) -> Result<()> {
    let registry = Registry::builtin();
    let set = TaskSet::install(&registry, &group);
    let task = set.find("deployer", "deploy")?;

    execute(task, &registry, &group, output).await
}
