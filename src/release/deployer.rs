// ABOUTME: The release engine: deploy, list releases, and single-step rollback.
// ABOUTME: All durable state lives on the remote host and is re-read on every operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::DeployError;
use super::hooks::{HookPoint, HookReport, run_hook};
use super::layout::RemoteLayout;
use super::listing::parse_listing;
use super::staging::{excluded_paths, remove_cmd, stage_cmd, staging_path};
use crate::config::Target;
use crate::transport::{self, Transport, TransportError};
use crate::types::ReleaseId;

/// Outcome of a successful deploy.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub host: String,
    pub release: ReleaseId,
    /// Hooks that ran, in order. Failed hooks are listed, not raised.
    pub hooks: Vec<HookReport>,
}

impl DeployReport {
    pub fn failed_hooks(&self) -> impl Iterator<Item = &HookReport> {
        self.hooks.iter().filter(|h| !h.success)
    }
}

/// Outcome of a rollback that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    /// `from` was renamed to its skip name and `current` now points at `to`.
    RolledBack { from: ReleaseId, to: ReleaseId },
    /// Fewer than two active releases; nothing was touched.
    NothingToRollBack,
}

/// Validated `from` / `to` pair.
#[derive(Debug, Clone)]
struct Paths {
    from: PathBuf,
    layout: RemoteLayout,
}

impl Paths {
    fn resolve(target: &Target) -> Option<Self> {
        let from = target.deployer.from_dir().filter(|p| !p.as_os_str().is_empty())?;
        let to = target.deployer.to_dir().filter(|t| !t.is_empty())?;
        Some(Self {
            from: from.to_path_buf(),
            layout: RemoteLayout::new(to),
        })
    }
}

/// Deploys one target.
///
/// Operations are strictly sequential round trips. Nothing guards against a
/// second deployer (or a rollback) working on the same target at the same
/// time: callers must serialize access to a target themselves.
pub struct Deployer {
    target: Target,
    paths: Option<Paths>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Deployer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deployer")
            .field("host", &self.target.host)
            .field("paths", &self.paths)
            .finish()
    }
}

impl Deployer {
    /// Operations exposed as tasks.
    pub const TASKS: &'static [&'static str] = &["deploy", "rollback"];

    /// Deployer using the transport the target is configured for.
    pub fn new(target: Target) -> Self {
        let transport = transport::for_target(&target);
        Self::with_transport(target, transport)
    }

    pub fn with_transport(target: Target, transport: Arc<dyn Transport>) -> Self {
        let paths = Paths::resolve(&target);
        Self {
            target,
            paths,
            transport,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Whether both `from` and `to` are configured. Performs no I/O.
    pub fn can_deploy(&self) -> bool {
        self.paths.is_some()
    }

    /// Remote layout of the target, if `to` is configured.
    pub fn layout(&self) -> Option<&RemoteLayout> {
        self.paths.as_ref().map(|p| &p.layout)
    }

    fn paths(&self) -> Result<&Paths, DeployError> {
        self.paths.as_ref().ok_or_else(|| DeployError::MissingSettings {
            host: self.target.host.clone(),
        })
    }

    /// Deploy a new release named after the current time.
    pub async fn deploy(&self) -> Result<DeployReport, DeployError> {
        self.deploy_release(ReleaseId::now()).await
    }

    /// Deploy a new release named `release`.
    ///
    /// Stages and filters the source tree locally, transfers it, then moves
    /// `current` to it between the before and after hooks. Until the
    /// pointer moves, the live release is untouched.
    pub async fn deploy_release(&self, release: ReleaseId) -> Result<DeployReport, DeployError> {
        let paths = self.paths()?;
        let host = &self.target.host;

        tracing::info!(%host, %release, "Deploying {} to {}", paths.from.display(), paths.layout.base());

        let staged = self.stage(paths, &release).await?;
        self.send_files(paths, &staged, &release).await?;

        let mut hooks = Vec::new();
        if let Some(report) = self.run_hook(HookPoint::Before, &release).await {
            hooks.push(report);
        }

        self.symlink(&paths.layout, &release).await?;

        if let Some(report) = self.run_hook(HookPoint::After, &release).await {
            hooks.push(report);
        }

        tracing::info!(%host, %release, "Release is live");

        Ok(DeployReport {
            host: host.clone(),
            release,
            hooks,
        })
    }

    /// Active releases in listing order, skip-marked ones excluded.
    pub async fn releases(&self) -> Result<Vec<ReleaseId>, DeployError> {
        let paths = self.paths()?;

        let mut raw = Vec::new();
        let output = self
            .transport
            .run_remote_streaming(&paths.layout.list_cmd(), &mut |chunk: &[u8]| {
                raw.extend_from_slice(chunk)
            })
            .await?;

        if !output.success() {
            return Err(DeployError::Listing { output });
        }

        Ok(parse_listing(&String::from_utf8_lossy(&raw)))
    }

    /// Retire the last active release and point `current` at the one before it.
    ///
    /// Reads the listing once and acts on it; a concurrent deploy between
    /// the read and the rename is not detected.
    pub async fn rollback(&self) -> Result<RollbackOutcome, DeployError> {
        let paths = self.paths()?;
        let mut releases = self.releases().await?;

        let (Some(abandoned), Some(previous)) = (releases.pop(), releases.pop()) else {
            tracing::warn!(host = %self.target.host, "No release to rollback to");
            return Ok(RollbackOutcome::NothingToRollBack);
        };

        tracing::info!(
            host = %self.target.host,
            "Rolling back from {} to {}",
            abandoned,
            previous
        );

        let output = self
            .transport
            .run_remote(&paths.layout.retire_cmd(&abandoned))
            .await?;
        if !output.success() {
            return Err(DeployError::Retire {
                release: abandoned,
                output,
            });
        }

        self.symlink(&paths.layout, &previous).await?;

        Ok(RollbackOutcome::RolledBack {
            from: abandoned,
            to: previous,
        })
    }

    /// Release the transport's connection, if it holds one.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.transport.close().await
    }

    async fn stage(&self, paths: &Paths, release: &ReleaseId) -> Result<PathBuf, DeployError> {
        let staged = staging_path(
            &self.target.deployer.staging_dir(),
            &self.target.host,
            release,
        );
        tracing::debug!("Staging release in {}", staged.display());

        let output = self
            .transport
            .run_local(&stage_cmd(&paths.from, &staged))
            .await?;
        if !output.success() {
            return Err(DeployError::Staging {
                release: release.clone(),
                output,
            });
        }

        let excluded = excluded_paths(&staged, self.target.deployer.exclude())?;
        if let Some(command) = remove_cmd(&excluded) {
            tracing::debug!("Excluding {} path(s)", excluded.len());
            let output = self.transport.run_local(&command).await?;
            if !output.success() {
                return Err(DeployError::Staging {
                    release: release.clone(),
                    output,
                });
            }
        }

        Ok(staged)
    }

    async fn send_files(
        &self,
        paths: &Paths,
        staged: &Path,
        release: &ReleaseId,
    ) -> Result<(), DeployError> {
        let layout = &paths.layout;

        let output = self
            .transport
            .run_remote(&layout.ensure_releases_dir_cmd())
            .await?;
        if !output.success() {
            return Err(DeployError::Transfer {
                release: release.clone(),
                output,
            });
        }

        let exists = self
            .transport
            .run_remote(&layout.release_exists_cmd(release))
            .await?;
        if exists.success() {
            return Err(DeployError::ReleaseExists(release.clone()));
        }

        tracing::debug!("Transferring {} to {}", staged.display(), layout.releases_dir());
        let output = self
            .transport
            .copy_to_remote(staged, &layout.releases_dir())
            .await?;
        if !output.success() {
            return Err(DeployError::Transfer {
                release: release.clone(),
                output,
            });
        }

        Ok(())
    }

    async fn symlink(&self, layout: &RemoteLayout, release: &ReleaseId) -> Result<(), DeployError> {
        let output = self
            .transport
            .run_remote(&layout.cutover_cmd(release))
            .await?;
        if !output.success() {
            return Err(DeployError::Cutover {
                release: release.clone(),
                output,
            });
        }
        tracing::debug!("{} -> {}", layout.current(), layout.release_dir(release));
        Ok(())
    }

    async fn run_hook(&self, point: HookPoint, release: &ReleaseId) -> Option<HookReport> {
        let script = match point {
            HookPoint::Before => self.target.deployer.before_script.as_deref(),
            HookPoint::After => self.target.deployer.after_script.as_deref(),
        }?;

        Some(
            run_hook(
                self.transport.as_ref(),
                point,
                script,
                self.target.deployer.hook_dir(),
                release,
            )
            .await,
        )
    }
}
