// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection, authentication, and command execution with streamed stdin and stdout.

use super::error::{Error, Result};
use russh::client::{self, Config, Handle};
use russh::keys::agent::client::AgentClient;
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::sync::mpsc;

/// Configuration for establishing an SSH session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    pub user: String,
    /// Private key to authenticate with.
    /// If None, the SSH agent is tried first, then the default key locations.
    pub key_path: Option<PathBuf>,
    /// Accept and remember unknown host keys (Trust On First Use).
    pub trust_on_first_use: bool,
    /// known_hosts file to verify against. None means ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Upper bound for a single remote command (default: 5 minutes).
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: None,
            trust_on_first_use: false,
            known_hosts_path: None,
            command_timeout: Duration::from_secs(300),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn trust_on_first_use(mut self, tofu: bool) -> Self {
        self.trust_on_first_use = tofu;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Captured result of a command, local or remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code of the command, -1 if it was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Most useful single line of diagnostics: stderr if any, else stdout.
    pub fn summary(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary();
        if summary.is_empty() {
            write!(f, "exit code {}", self.exit_code)
        } else {
            write!(f, "exit code {}: {}", self.exit_code, summary)
        }
    }
}

/// Host key verification for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    trust_on_first_use: bool,
    known_hosts_path: Option<PathBuf>,
}

impl SshHandler {
    fn new(config: &SessionConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            trust_on_first_use: config.trust_on_first_use,
            known_hosts_path: config.known_hosts_path.clone(),
        }
    }

    fn learn(&self, key: &ssh_key::PublicKey) {
        let learned = match &self.known_hosts_path {
            Some(path) => learn_known_hosts_path(&self.host, self.port, key, path),
            None => learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = learned {
            tracing::warn!("Failed to save host key to known_hosts: {}", e);
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let known = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match known {
            Ok(true) => Ok(true),
            Ok(false) if self.trust_on_first_use => {
                tracing::warn!(
                    "Trust-On-First-Use: accepting unknown host key for {}:{}",
                    self.host,
                    self.port
                );
                self.learn(server_public_key);
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::error!("Host key for {}:{} changed", self.host, self.port);
                Ok(false)
            }
            Err(_) => Ok(self.trust_on_first_use),
        }
    }
}

enum AuthMethod {
    Agent(AgentClient<UnixStream>),
    KeyFile(Arc<ssh_key::PrivateKey>),
}

/// An established SSH session.
pub struct Session {
    config: SessionConfig,
    handle: Handle<SshHandler>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Session {
    /// Connect and authenticate.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let auth_method = Self::resolve_auth_method(&config).await?;

        let russh_config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        tracing::debug!("Connecting to {}@{}:{}", config.user, config.host, config.port);

        let mut handle = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            SshHandler::new(&config),
        )
        .await
        .map_err(|e| Error::Connection {
            host: config.host.clone(),
            port: config.port,
            reason: e.to_string(),
        })?;

        if !Self::authenticate(&mut handle, &config, auth_method).await? {
            return Err(Error::AuthenticationFailed(format!(
                "{}@{}",
                config.user, config.host
            )));
        }

        Ok(Self { config, handle })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn resolve_auth_method(config: &SessionConfig) -> Result<AuthMethod> {
        if let Some(key_path) = &config.key_path {
            let key = load_secret_key(key_path, None).map_err(|e| Error::KeyLoadFailed {
                path: key_path.clone(),
                reason: e.to_string(),
            })?;
            return Ok(AuthMethod::KeyFile(Arc::new(key)));
        }

        if let Ok(agent) = AgentClient::connect_env().await {
            return Ok(AuthMethod::Agent(agent));
        }

        let home = std::env::var("HOME").map_err(|_| {
            Error::AgentUnavailable("SSH agent not available and HOME not set".to_string())
        })?;

        for name in ["id_ed25519", "id_rsa", "id_ecdsa"] {
            let key_path = format!("{}/.ssh/{}", home, name);
            if let Ok(key) = load_secret_key(&key_path, None) {
                return Ok(AuthMethod::KeyFile(Arc::new(key)));
            }
        }

        Err(Error::AgentUnavailable(
            "SSH agent not available and no default keys found".to_string(),
        ))
    }

    async fn authenticate(
        handle: &mut Handle<SshHandler>,
        config: &SessionConfig,
        auth_method: AuthMethod,
    ) -> Result<bool> {
        match auth_method {
            AuthMethod::Agent(mut agent) => {
                let keys = agent.request_identities().await.map_err(|e| {
                    Error::AgentUnavailable(format!("failed to list agent keys: {}", e))
                })?;

                if keys.is_empty() {
                    return Err(Error::AgentUnavailable("no keys in SSH agent".to_string()));
                }

                for key in &keys {
                    match handle
                        .authenticate_publickey_with(&config.user, key.clone(), None, &mut agent)
                        .await
                    {
                        Ok(result) if result.success() => return Ok(true),
                        _ => continue,
                    }
                }
                Ok(false)
            }
            AuthMethod::KeyFile(key) => {
                let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
                let result = handle
                    .authenticate_publickey(&config.user, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await?;
                Ok(result.success())
            }
        }
    }

    /// Execute a command on the remote host.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        self.run(command, None).await
    }

    /// Execute a command, handing each stdout chunk to `sink` as it arrives.
    ///
    /// The returned output still carries the complete stdout.
    pub async fn exec_streaming(
        &self,
        command: &str,
        sink: &mut (dyn FnMut(&[u8]) + Send),
    ) -> Result<CommandOutput> {
        self.run(command, Some(sink)).await
    }

    /// Execute a command, writing every chunk received from `stdin` to its
    /// standard input, followed by EOF once the sender is dropped.
    ///
    /// The command timeout bounds each chunk and the wait for the exit
    /// status, not the transfer as a whole.
    pub async fn exec_with_stdin(
        &self,
        command: &str,
        mut stdin: mpsc::Receiver<Vec<u8>>,
    ) -> Result<CommandOutput> {
        let timeout = self.config.command_timeout;
        tracing::debug!(host = %self.config.host, "exec (stdin): {}", command);

        let channel = within(timeout, self.open(command)).await?;

        let mut sent = 0usize;
        while let Some(chunk) = stdin.recv().await {
            within(timeout, async {
                channel
                    .data(&chunk[..])
                    .await
                    .map_err(|e| Error::Payload(e.to_string()))
            })
            .await?;
            sent += chunk.len();
        }
        channel
            .eof()
            .await
            .map_err(|e| Error::Payload(e.to_string()))?;
        tracing::debug!(host = %self.config.host, "sent {} bytes of stdin", sent);

        within(timeout, collect(channel, None)).await
    }

    async fn run(
        &self,
        command: &str,
        sink: Option<&mut (dyn FnMut(&[u8]) + Send)>,
    ) -> Result<CommandOutput> {
        let timeout = self.config.command_timeout;
        tracing::debug!(host = %self.config.host, "exec: {}", command);
        within(timeout, async {
            let channel = self.open(command).await?;
            collect(channel, sink).await
        })
        .await
    }

    async fn open(&self, command: &str) -> Result<Channel<client::Msg>> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        Ok(channel)
    }

    /// Disconnect the session.
    pub async fn disconnect(&self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

async fn within<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::CommandTimeout(timeout))?
}

/// Read a started command's output until it exits.
async fn collect(
    mut channel: Channel<client::Msg>,
    mut sink: Option<&mut (dyn FnMut(&[u8]) + Send)>,
) -> Result<CommandOutput> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_code = None;
    let mut got_eof = false;

    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => {
                if let Some(sink) = sink.as_mut() {
                    sink(&data);
                }
                stdout.extend_from_slice(&data);
            }
            Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                stderr.extend_from_slice(&data);
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                exit_code = Some(exit_status as i32);
                if got_eof {
                    break;
                }
            }
            Some(ChannelMsg::Eof) => {
                got_eof = true;
                if exit_code.is_some() {
                    break;
                }
            }
            Some(ChannelMsg::Close) | None => break,
            Some(_) => {}
        }
    }

    // No exit status means the connection dropped mid-command.
    let exit_code = exit_code.ok_or(Error::ChannelClosed)?;

    Ok(CommandOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_defaults() {
        let config = SessionConfig::new("example.com", "deploy");
        assert_eq!(config.port, 22);
        assert!(config.key_path.is_none());
        assert!(!config.trust_on_first_use);
        assert_eq!(config.command_timeout, Duration::from_secs(300));
    }

    #[test]
    fn session_config_builder() {
        let config = SessionConfig::new("example.com", "deploy")
            .port(2222)
            .key_path("/home/deploy/.ssh/id_ed25519")
            .trust_on_first_use(true)
            .command_timeout(Duration::from_secs(10));

        assert_eq!(config.port, 2222);
        assert_eq!(
            config.key_path,
            Some(PathBuf::from("/home/deploy/.ssh/id_ed25519"))
        );
        assert!(config.trust_on_first_use);
        assert_eq!(config.command_timeout, Duration::from_secs(10));
    }

    #[test]
    fn summary_prefers_stderr() {
        let output = CommandOutput {
            exit_code: 1,
            stdout: "partial\n".to_string(),
            stderr: "tar: unexpected EOF\n".to_string(),
        };
        assert_eq!(output.summary(), "tar: unexpected EOF");
        assert_eq!(output.to_string(), "exit code 1: tar: unexpected EOF");
    }

    #[test]
    fn summary_falls_back_to_stdout() {
        let output = CommandOutput {
            exit_code: 2,
            stdout: "no such file\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.summary(), "no such file");
    }

    #[test]
    fn display_without_output() {
        let output = CommandOutput {
            exit_code: 127,
            ..Default::default()
        };
        assert_eq!(output.to_string(), "exit code 127");
    }
}
