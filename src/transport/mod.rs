// ABOUTME: The command execution port used by the release engine.
// ABOUTME: Local shell commands, remote commands, and copying a local path to a remote directory.

mod error;
mod local;
pub mod shell;
mod ssh;

pub use crate::ssh::CommandOutput;
pub use error::{TransportError, TransportErrorKind};
pub use local::{LocalTransport, run_shell};
pub use ssh::SshTransport;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::config::{Target, TransportKind};

/// Everything the release engine needs to reach the outside world.
///
/// A returned `Ok` only means the command ran; check
/// [`CommandOutput::success`] for its exit status.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a shell command on the deploying machine.
    async fn run_local(&self, command: &str) -> Result<CommandOutput, TransportError>;

    /// Run a shell command on the target host.
    async fn run_remote(&self, command: &str) -> Result<CommandOutput, TransportError>;

    /// Run a shell command on the target host, feeding stdout to `sink` as it arrives.
    async fn run_remote_streaming(
        &self,
        command: &str,
        sink: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<CommandOutput, TransportError>;

    /// Copy `local` (file or directory) into `remote_dir` on the target host,
    /// keeping its file name: `<remote_dir>/<basename of local>`.
    async fn copy_to_remote(
        &self,
        local: &Path,
        remote_dir: &str,
    ) -> Result<CommandOutput, TransportError>;

    /// Release any connection held open. Further calls may reconnect.
    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Default transport for a target, chosen by its configured transport kind.
pub fn for_target(target: &Target) -> Arc<dyn Transport> {
    match target.transport {
        TransportKind::Local => Arc::new(LocalTransport::new()),
        TransportKind::Ssh => Arc::new(SshTransport::new(target.session_config())),
    }
}
