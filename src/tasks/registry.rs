// ABOUTME: Explicit table of the engines tasks can be built from.
// ABOUTME: The deployer is the only built-in engine.

use async_trait::async_trait;

use super::{Engine, TaskError, TaskOutcome};
use crate::config::Target;
use crate::release::{DeployError, Deployer};
use crate::transport::TransportError;

/// How to build an engine for a target, and which operations it offers.
#[derive(Clone, Copy)]
pub struct EngineSpec {
    pub key: &'static str,
    pub tasks: &'static [&'static str],
    pub build: fn(&Target) -> Result<Box<dyn Engine>, TaskError>,
}

impl EngineSpec {
    pub fn has_task(&self, task: &str) -> bool {
        self.tasks.iter().any(|t| *t == task)
    }
}

impl std::fmt::Debug for EngineSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSpec")
            .field("key", &self.key)
            .field("tasks", &self.tasks)
            .finish()
    }
}

/// Registered engines, in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    specs: Vec<EngineSpec>,
}

impl Registry {
    /// Registry holding the built-in engines.
    pub fn builtin() -> Self {
        Self {
            specs: vec![EngineSpec {
                key: "deployer",
                tasks: Deployer::TASKS,
                build: build_deployer,
            }],
        }
    }

    pub fn register(&mut self, spec: EngineSpec) -> Result<(), TaskError> {
        if self.get(spec.key).is_some() {
            return Err(TaskError::DuplicateEngine(spec.key.to_string()));
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&EngineSpec> {
        self.specs.iter().find(|spec| spec.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineSpec> {
        self.specs.iter()
    }
}

fn build_deployer(target: &Target) -> Result<Box<dyn Engine>, TaskError> {
    Ok(Box::new(Deployer::new(target.clone())))
}

#[async_trait]
impl Engine for Deployer {
    fn can_run(&self) -> bool {
        self.can_deploy()
    }

    async fn invoke(&self, task: &str) -> Result<TaskOutcome, TaskError> {
        let wrap = |source: DeployError| TaskError::Deploy {
            host: self.target().host.clone(),
            source,
        };

        match task {
            "deploy" => self.deploy().await.map(TaskOutcome::Deployed).map_err(wrap),
            "rollback" => self
                .rollback()
                .await
                .map(TaskOutcome::RolledBack)
                .map_err(wrap),
            other => Err(TaskError::UnknownOperation {
                engine: "deployer".to_string(),
                task: other.to_string(),
            }),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        Deployer::close(self).await
    }
}
