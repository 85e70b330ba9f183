// ABOUTME: Configuration types and parsing for cutover.yml.
// ABOUTME: Handles YAML parsing, per-server deployer overrides and destination groups.

mod deployer;
mod deserialize;
mod init;
mod server;
mod target;

pub use deployer::{DEFAULT_HOOK_DIR, DeployerConfig};
pub use init::init_config;
pub use server::{ServerConfig, TransportKind};
pub use target::Target;

use crate::error::{Error, Result};
use crate::types::GroupName;
use deserialize::{deserialize_group_name, deserialize_servers, deserialize_servers_option};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "cutover.yml";
pub const CONFIG_FILENAME_ALT: &str = "cutover.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".cutover/config.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Group name, the optional first segment of every task name.
    #[serde(default, deserialize_with = "deserialize_group_name")]
    pub name: Option<GroupName>,

    #[serde(deserialize_with = "deserialize_servers")]
    pub servers: NonEmpty<ServerConfig>,

    /// Deployer settings shared by every server.
    #[serde(default)]
    pub deployer: DeployerConfig,

    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    #[serde(default)]
    pub destinations: BTreeMap<String, Destination>,
}

/// A named group of servers deployed as a unit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Destination {
    #[serde(default, deserialize_with = "deserialize_servers_option")]
    pub servers: Option<NonEmpty<ServerConfig>>,

    /// Overrides applied on top of the top-level deployer settings.
    #[serde(default)]
    pub deployer: DeployerConfig,
}

pub(crate) fn default_command_timeout() -> Duration {
    Duration::from_secs(300)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// The configuration as seen by destination `name`: its servers replace
    /// the top-level ones, its deployer settings override field by field,
    /// and its name becomes the group name.
    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let group = GroupName::new(name).map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let mut merged = self.clone();
        merged.name = Some(group);
        merged.destinations.clear();

        if let Some(ref servers) = dest.servers {
            merged.servers = servers.clone();
        }

        merged.deployer = self.deployer.merged_with(&dest.deployer);

        Ok(merged)
    }

    /// One resolved target per server, in configuration order.
    pub fn targets(&self) -> NonEmpty<Target> {
        self.servers
            .clone()
            .map(|server| Target::resolve(&server, &self.deployer, self.command_timeout))
    }
}
