// ABOUTME: Errors raised while talking to a remote host over SSH.
// ABOUTME: A remote command exiting non-zero is not an error at this layer.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// TCP connect or handshake failed.
    #[error("connection to {host}:{port} failed: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("authentication failed for {0}: no valid credentials")]
    AuthenticationFailed(String),

    #[error("SSH agent not available: {0}")]
    AgentUnavailable(String),

    #[error("failed to load key from {}: {reason}", .path.display())]
    KeyLoadFailed { path: PathBuf, reason: String },

    /// The session could not open a channel or start the command.
    #[error("failed to start remote command: {0}")]
    CommandFailed(String),

    /// Writing the stdin payload of a remote command failed.
    #[error("failed to send data to remote command: {0}")]
    Payload(String),

    #[error("remote command timed out after {0:?}")]
    CommandTimeout(Duration),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
