// ABOUTME: Test support utilities.
// ABOUTME: Local deploy fixtures and a transport that can be told to fail.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use cutover::config::{DeployerConfig, Target};
use cutover::release::Deployer;
use cutover::transport::{CommandOutput, LocalTransport, Transport, TransportError};
use parking_lot::Mutex;
use tempfile::TempDir;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("cutover=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A source tree, a fake remote root and scratch directories, all temporary.
#[allow(dead_code)]
pub struct Fixture {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(app.join("tmp/cache")).unwrap();
        fs::write(app.join("app.rb"), "puts 'hello'").unwrap();
        fs::write(app.join("debug.log"), "noise").unwrap();
        fs::write(app.join("tmp/cache/page.html"), "<html>").unwrap();
        fs::create_dir_all(dir.path().join("staging")).unwrap();
        fs::create_dir_all(dir.path().join("hooks")).unwrap();
        Self { dir }
    }

    pub fn from_dir(&self) -> PathBuf {
        self.dir.path().join("app")
    }

    pub fn to_dir(&self) -> PathBuf {
        self.dir.path().join("remote")
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.to_dir().join("releases")
    }

    pub fn current(&self) -> PathBuf {
        self.to_dir().join("current")
    }

    /// Release directory `current` points at, if any.
    pub fn current_target(&self) -> Option<PathBuf> {
        fs::read_link(self.current()).ok()
    }

    pub fn deployer_config(&self) -> DeployerConfig {
        DeployerConfig {
            from: Some(self.from_dir()),
            to: Some(self.to_dir().to_string_lossy().into_owned()),
            staging_dir: Some(self.dir.path().join("staging")),
            hook_dir: Some(self.dir.path().join("hooks").to_string_lossy().into_owned()),
            ..Default::default()
        }
    }

    /// Write an executable-to-be script into the fixture and return its path.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        path
    }

    pub fn target(&self, deployer: DeployerConfig) -> Target {
        Target::local("localhost", deployer)
    }

    pub fn deployer(&self, deployer: DeployerConfig) -> Deployer {
        Deployer::with_transport(self.target(deployer), Arc::new(LocalTransport::new()))
    }

    /// Entries of the releases directory, sorted.
    pub fn release_entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = match fs::read_dir(self.releases_dir()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        entries.sort();
        entries
    }
}

/// Runs everything locally, except remote commands containing `fail_on`,
/// which exit 1 without running. Records every remote command.
#[allow(dead_code)]
pub struct FlakyTransport {
    inner: LocalTransport,
    fail_on: String,
    pub remote_commands: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FlakyTransport {
    pub fn new(fail_on: impl Into<String>) -> Self {
        Self {
            inner: LocalTransport::new(),
            fail_on: fail_on.into(),
            remote_commands: Mutex::new(Vec::new()),
        }
    }

    fn refuse(&self, command: &str) -> Option<CommandOutput> {
        self.remote_commands.lock().push(command.to_string());
        command.contains(&self.fail_on).then(|| CommandOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: format!("refused: {command}"),
        })
    }
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn run_local(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.inner.run_local(command).await
    }

    async fn run_remote(&self, command: &str) -> Result<CommandOutput, TransportError> {
        if let Some(output) = self.refuse(command) {
            return Ok(output);
        }
        self.inner.run_remote(command).await
    }

    async fn run_remote_streaming(
        &self,
        command: &str,
        sink: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<CommandOutput, TransportError> {
        if let Some(output) = self.refuse(command) {
            return Ok(output);
        }
        self.inner.run_remote_streaming(command, sink).await
    }

    async fn copy_to_remote(
        &self,
        local: &Path,
        remote_dir: &str,
    ) -> Result<CommandOutput, TransportError> {
        if let Some(output) = self.refuse(&format!("copy {} {}", local.display(), remote_dir)) {
            return Ok(output);
        }
        self.inner.copy_to_remote(local, remote_dir).await
    }
}
