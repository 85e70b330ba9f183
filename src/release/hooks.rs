// ABOUTME: Hooks run on the remote host around the cutover.
// ABOUTME: Best effort: a failing hook is reported and logged but never aborts the deploy.

use std::path::{Path, PathBuf};

use super::layout::RemoteLayout;
use crate::transport::Transport;
use crate::types::ReleaseId;

/// Hook execution points in the deploy sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// After the transfer, before the current pointer moves.
    Before,
    /// After the current pointer moved.
    After,
}

impl HookPoint {
    /// Name of the setting configuring this hook.
    pub fn setting(&self) -> &'static str {
        match self {
            HookPoint::Before => "before_script",
            HookPoint::After => "after_script",
        }
    }
}

/// Result of running a hook.
#[derive(Debug, Clone)]
pub struct HookReport {
    pub point: HookPoint,
    pub script: PathBuf,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HookReport {
    fn failed(point: HookPoint, script: &Path, stderr: String) -> Self {
        Self {
            point,
            script: script.to_path_buf(),
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr,
        }
    }
}

/// Upload `script` to `hook_dir` and run it with the release id as argument.
pub async fn run_hook(
    transport: &dyn Transport,
    point: HookPoint,
    script: &Path,
    hook_dir: &str,
    release: &ReleaseId,
) -> HookReport {
    let Some(name) = script.file_name() else {
        return HookReport::failed(point, script, "hook path has no file name".to_string());
    };

    tracing::info!("Running {} hook: {}", point.setting(), script.display());

    match transport.copy_to_remote(script, hook_dir).await {
        Ok(output) if output.success() => {}
        Ok(output) => {
            tracing::warn!("Failed to upload {} hook: {}", point.setting(), output);
            return HookReport::failed(point, script, output.summary().to_string());
        }
        Err(e) => {
            tracing::warn!("Failed to upload {} hook: {}", point.setting(), e);
            return HookReport::failed(point, script, e.to_string());
        }
    }

    let remote_hook = format!(
        "{}/{}",
        hook_dir.trim_end_matches('/'),
        name.to_string_lossy()
    );

    match transport
        .run_remote(&RemoteLayout::hook_cmd(&remote_hook, release))
        .await
    {
        Ok(output) => {
            if output.success() {
                tracing::info!("{} hook completed successfully", point.setting());
            } else {
                tracing::warn!(
                    "{} hook failed with exit code {}",
                    point.setting(),
                    output.exit_code
                );
            }
            HookReport {
                point,
                script: script.to_path_buf(),
                success: output.success(),
                exit_code: Some(output.exit_code),
                stdout: output.stdout,
                stderr: output.stderr,
            }
        }
        Err(e) => {
            tracing::error!("Failed to execute {} hook: {}", point.setting(), e);
            HookReport::failed(point, script, e.to_string())
        }
    }
}
