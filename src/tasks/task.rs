// ABOUTME: Tasks installed for a group and their sequential execution.
// ABOUTME: Task names follow `[group:]engine:operation`.

use super::{Group, Registry, TaskError, TaskOutcome};
use crate::diagnostics::{Diagnostics, Warning};

/// One engine operation, bound to a group by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub engine: &'static str,
    pub operation: &'static str,
}

/// Result of a task on one target.
#[derive(Debug, Clone)]
pub struct TaskRun {
    pub host: String,
    pub outcome: TaskOutcome,
}

impl Task {
    /// Run the task on every target of `group`, one after the other.
    ///
    /// Targets the engine is not configured for are skipped with a warning.
    /// The first failure stops the run; targets after it are not touched.
    pub async fn invoke(
        &self,
        registry: &Registry,
        group: &Group,
        diag: &mut Diagnostics,
    ) -> Result<Vec<TaskRun>, TaskError> {
        let spec = registry
            .get(self.engine)
            .ok_or_else(|| TaskError::UnknownEngine(self.engine.to_string()))?;

        let mut runs = Vec::new();

        for target in group.targets.iter() {
            let engine = (spec.build)(target)?;

            if !engine.can_run() {
                diag.warn(Warning::target_skipped(format!(
                    "{}: skipping {}, {} is not configured for it",
                    self.name, target.host, self.engine
                )));
                continue;
            }

            tracing::debug!("Running {} on {}", self.name, target.host);
            let result = engine.invoke(self.operation).await;

            if let Err(e) = engine.close().await {
                diag.warn(Warning::ssh_disconnect(format!(
                    "disconnect from {} failed: {}",
                    target.host, e
                )));
            }

            let outcome = result?;
            if let TaskOutcome::Deployed(report) = &outcome {
                for hook in report.failed_hooks() {
                    diag.warn(Warning::hook_failed(format!(
                        "{}: {} hook {} failed: {}",
                        target.host,
                        hook.point.setting(),
                        hook.script.display(),
                        hook.stderr.trim()
                    )));
                }
            }

            runs.push(TaskRun {
                host: target.host.clone(),
                outcome,
            });
        }

        Ok(runs)
    }
}

/// Every task a registry offers for one group.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    pub fn install(registry: &Registry, group: &Group) -> Self {
        let prefix = group.prefix();
        let tasks = registry
            .iter()
            .flat_map(|spec| {
                let prefix = prefix.clone();
                spec.tasks.iter().map(move |operation| Task {
                    name: format!("{prefix}{}:{operation}", spec.key),
                    engine: spec.key,
                    operation: *operation,
                })
            })
            .collect();

        Self { tasks }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name == name)
    }

    /// The task running `operation` of `engine`.
    pub fn find(&self, engine: &str, operation: &str) -> Result<&Task, TaskError> {
        self.tasks
            .iter()
            .find(|task| task.engine == engine && task.operation == operation)
            .ok_or_else(|| TaskError::UnknownTask(format!("{engine}:{operation}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|task| task.name.as_str())
    }
}
