// ABOUTME: Named tasks over groups of targets.
// ABOUTME: Engines are looked up in an explicit registry and run target by target.

mod error;
mod group;
mod registry;
mod task;

pub use error::TaskError;
pub use group::Group;
pub use registry::{EngineSpec, Registry};
pub use task::{Task, TaskRun, TaskSet};

use async_trait::async_trait;

use crate::release::{DeployReport, RollbackOutcome};
use crate::transport::TransportError;

/// Something that can run named operations against a single target.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Whether the target is configured for this engine. Performs no I/O.
    fn can_run(&self) -> bool;

    /// Run operation `task`.
    async fn invoke(&self, task: &str) -> Result<TaskOutcome, TaskError>;

    /// Release whatever connection the engine holds.
    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// What an engine operation produced.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Deployed(DeployReport),
    RolledBack(RollbackOutcome),
}
