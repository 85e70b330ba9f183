// ABOUTME: Transport error types with SNAFU pattern.
// ABOUTME: Failures to run a command at all, as opposed to commands that exit non-zero.

use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    #[snafu(display("failed to spawn local command: {source}"))]
    Spawn { source: std::io::Error },

    #[snafu(display("SSH to {host} failed: {source}"))]
    Ssh {
        host: String,
        source: crate::ssh::Error,
    },

    #[snafu(display("failed to archive {}: {source}", path.display()))]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The local shell could not be started.
    Spawn,
    /// Connecting or authenticating to the target failed.
    Connection,
    /// The session was up but the command could not be run to completion.
    Command,
    /// The local path could not be packed for transfer.
    Archive,
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        use crate::ssh::Error as SshError;

        match self {
            TransportError::Spawn { .. } => TransportErrorKind::Spawn,
            TransportError::Archive { .. } => TransportErrorKind::Archive,
            TransportError::Ssh { source, .. } => match source {
                SshError::Connection { .. }
                | SshError::AuthenticationFailed(_)
                | SshError::AgentUnavailable(_)
                | SshError::KeyLoadFailed { .. } => TransportErrorKind::Connection,
                _ => TransportErrorKind::Command,
            },
        }
    }
}
