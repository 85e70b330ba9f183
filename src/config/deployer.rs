// ABOUTME: Deployer settings: source tree, remote base path, exclusions and hooks.
// ABOUTME: Defaults at the top level are overridden field by field per server or destination.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::target::expand_home;

/// Remote directory hook scripts are uploaded to before they run.
pub const DEFAULT_HOOK_DIR: &str = "/tmp";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployerConfig {
    /// Local application tree to deploy.
    #[serde(default)]
    pub from: Option<PathBuf>,

    /// Remote base path holding `current` and `releases/`.
    #[serde(default)]
    pub to: Option<String>,

    /// Glob patterns, relative to the staged tree, removed before transfer.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    /// Local script run on the remote host before the cutover.
    #[serde(default)]
    pub before_script: Option<PathBuf>,

    /// Local script run on the remote host after the cutover.
    #[serde(default)]
    pub after_script: Option<PathBuf>,

    /// Local directory releases are staged under.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    #[serde(default)]
    pub hook_dir: Option<String>,
}

impl DeployerConfig {
    /// Settings from `self`, with every field `overrides` sets taking precedence.
    pub fn merged_with(&self, overrides: &DeployerConfig) -> DeployerConfig {
        DeployerConfig {
            from: overrides.from.clone().or_else(|| self.from.clone()),
            to: overrides.to.clone().or_else(|| self.to.clone()),
            exclude: overrides.exclude.clone().or_else(|| self.exclude.clone()),
            before_script: overrides
                .before_script
                .clone()
                .or_else(|| self.before_script.clone()),
            after_script: overrides
                .after_script
                .clone()
                .or_else(|| self.after_script.clone()),
            staging_dir: overrides
                .staging_dir
                .clone()
                .or_else(|| self.staging_dir.clone()),
            hook_dir: overrides.hook_dir.clone().or_else(|| self.hook_dir.clone()),
        }
    }

    /// Same settings with a leading `~` in every local path replaced by `$HOME`.
    ///
    /// `to` and `hook_dir` are remote paths and stay as written.
    pub fn with_home_expanded(mut self) -> Self {
        let local = [
            &mut self.from,
            &mut self.before_script,
            &mut self.after_script,
            &mut self.staging_dir,
        ];
        for path in local.into_iter().flatten() {
            *path = expand_home(path.as_path());
        }
        self
    }

    pub fn exclude(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or_default()
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn hook_dir(&self) -> &str {
        self.hook_dir.as_deref().unwrap_or(DEFAULT_HOOK_DIR)
    }

    pub fn from_dir(&self) -> Option<&Path> {
        self.from.as_deref()
    }

    pub fn to_dir(&self) -> Option<&str> {
        self.to.as_deref()
    }
}
