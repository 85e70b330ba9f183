// ABOUTME: Transport that treats the deploying machine itself as the target host.
// ABOUTME: Every command runs through `sh -c`; copies use `cp -R`.

use async_trait::async_trait;
use snafu::ResultExt;
use std::path::Path;
use tokio::process::Command;

use super::error::{SpawnSnafu, TransportError};
use super::shell::{quote_local, quote_path};
use super::{CommandOutput, Transport};

/// Run `command` with `sh -c` and capture its output.
pub async fn run_shell(command: &str) -> Result<CommandOutput, TransportError> {
    tracing::debug!("sh -c {}", command);

    let output = Command::new("sh")
        .args(["-c", command])
        .output()
        .await
        .context(SpawnSnafu)?;

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Target host is the local machine. Useful for `localhost` targets and tests.
#[derive(Debug, Default, Clone)]
pub struct LocalTransport;

impl LocalTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn run_local(&self, command: &str) -> Result<CommandOutput, TransportError> {
        run_shell(command).await
    }

    async fn run_remote(&self, command: &str) -> Result<CommandOutput, TransportError> {
        run_shell(command).await
    }

    async fn run_remote_streaming(
        &self,
        command: &str,
        sink: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<CommandOutput, TransportError> {
        let output = run_shell(command).await?;
        sink(output.stdout.as_bytes());
        Ok(output)
    }

    async fn copy_to_remote(
        &self,
        local: &Path,
        remote_dir: &str,
    ) -> Result<CommandOutput, TransportError> {
        let dir = quote_path(remote_dir.trim_end_matches('/'));
        run_shell(&format!(
            "mkdir -p {dir} && cp -R {} {dir}/",
            quote_local(local)
        ))
        .await
    }
}
