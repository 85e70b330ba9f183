// ABOUTME: Fully resolved description of one deployable endpoint.
// ABOUTME: Combines a server entry with the deployer defaults and connection settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{DeployerConfig, ServerConfig, TransportKind};
use crate::ssh::SessionConfig;

#[derive(Debug, Clone)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key_path: Option<PathBuf>,
    pub trust_first_connection: bool,
    pub transport: TransportKind,
    pub command_timeout: Duration,
    pub deployer: DeployerConfig,
}

impl Target {
    /// Resolve `server` against the group-wide deployer defaults.
    ///
    /// Without an explicit user, `$USER` is used, then `root`. A leading `~`
    /// in the key path and the local deployer paths is expanded here.
    pub fn resolve(server: &ServerConfig, defaults: &DeployerConfig, command_timeout: Duration) -> Self {
        let user = server
            .user
            .clone()
            .unwrap_or_else(|| std::env::var("USER").unwrap_or_else(|_| "root".to_string()));

        Self {
            host: server.host.clone(),
            port: server.port,
            user,
            key_path: server.key_path.as_deref().map(expand_home),
            trust_first_connection: server.trust_first_connection,
            transport: server.transport,
            command_timeout,
            deployer: defaults.merged_with(&server.deployer).with_home_expanded(),
        }
    }

    /// A target on the local machine, mostly for tests and `localhost` setups.
    pub fn local(host: impl Into<String>, deployer: DeployerConfig) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: "root".to_string(),
            key_path: None,
            trust_first_connection: false,
            transport: TransportKind::Local,
            command_timeout: super::default_command_timeout(),
            deployer: deployer.with_home_expanded(),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new(&self.host, &self.user)
            .port(self.port)
            .trust_on_first_use(self.trust_first_connection)
            .command_timeout(self.command_timeout);
        if let Some(key) = &self.key_path {
            config = config.key_path(key);
        }
        config
    }
}

pub(super) fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
