// ABOUTME: Error types for release operations.
// ABOUTME: Splits precondition failures from fatal failures of a remote step.

use crate::transport::{CommandOutput, TransportError};
use crate::types::ReleaseId;

/// Errors that abort a deploy or rollback.
///
/// Every fatal variant is raised before the step after it runs, so the
/// remote state is what the preceding steps left behind.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// `from` or `to` is not configured for the target.
    #[error("{host}: deployer needs both `from` and `to` to be set")]
    MissingSettings { host: String },

    #[error("invalid exclude pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Copying the source tree or applying exclusions locally failed.
    #[error("could not stage release {release}: {output}")]
    Staging {
        release: ReleaseId,
        output: CommandOutput,
    },

    /// Two deploys within the same second produce the same id.
    #[error("release {0} already exists on the remote host")]
    ReleaseExists(ReleaseId),

    #[error("could not transfer release {release}: {output}")]
    Transfer {
        release: ReleaseId,
        output: CommandOutput,
    },

    #[error("could not symlink release {release} as current: {output}")]
    Cutover {
        release: ReleaseId,
        output: CommandOutput,
    },

    /// Renaming the abandoned release to its skip name failed during rollback.
    #[error("could not mark release {release} as skipped: {output}")]
    Retire {
        release: ReleaseId,
        output: CommandOutput,
    },

    #[error("could not list releases: {output}")]
    Listing { output: CommandOutput },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Detected before any remote I/O; nothing was touched.
    Precondition,
    /// A step failed mid-operation; the rest of the sequence was skipped.
    Fatal,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::MissingSettings { .. } | DeployError::InvalidPattern { .. } => {
                DeployErrorKind::Precondition
            }
            _ => DeployErrorKind::Fatal,
        }
    }

    /// Output of the command whose failure raised this error, if any.
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            DeployError::Staging { output, .. }
            | DeployError::Transfer { output, .. }
            | DeployError::Cutover { output, .. }
            | DeployError::Retire { output, .. }
            | DeployError::Listing { output } => Some(output),
            _ => None,
        }
    }
}
