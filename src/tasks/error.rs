// ABOUTME: Error types for task lookup and execution.
// ABOUTME: Wraps engine failures with the host they happened on.

use crate::release::DeployError;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    #[error("engine {engine} has no operation {task}")]
    UnknownOperation { engine: String, task: String },

    #[error("engine {0} is already registered")]
    DuplicateEngine(String),

    #[error("{host}: {source}")]
    Deploy {
        host: String,
        #[source]
        source: DeployError,
    },
}

impl TaskError {
    /// The deploy error behind this failure, if any.
    pub fn deploy_error(&self) -> Option<&DeployError> {
        match self {
            TaskError::Deploy { source, .. } => Some(source),
            _ => None,
        }
    }
}
