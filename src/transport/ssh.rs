// ABOUTME: Transport over a russh session, connected lazily and reused.
// ABOUTME: Copies stream a tar archive, chunk by chunk, into `tar -x` on the remote side.

use async_trait::async_trait;
use snafu::ResultExt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::sync::{OnceCell, mpsc};

use super::error::{ArchiveSnafu, SshSnafu, TransportError};
use super::local::run_shell;
use super::shell::quote_path;
use super::{CommandOutput, Transport};
use crate::ssh::{Session, SessionConfig};

pub struct SshTransport {
    config: SessionConfig,
    session: OnceCell<Session>,
}

impl std::fmt::Debug for SshTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTransport")
            .field("host", &self.config.host)
            .field("connected", &self.session.initialized())
            .finish()
    }
}

impl SshTransport {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: OnceCell::new(),
        }
    }

    async fn session(&self) -> Result<&Session, TransportError> {
        self.session
            .get_or_try_init(|| Session::connect(self.config.clone()))
            .await
            .context(SshSnafu {
                host: &self.config.host,
            })
    }
}

/// Archive bytes buffered before a chunk is handed to the channel.
const CHUNK_SIZE: usize = 256 * 1024;

/// Chunks queued between the archiver and the upload.
const UPLOAD_QUEUE: usize = 8;

/// Pack `path` into `out` as a tar archive whose single top-level entry is
/// its file name.
fn pack<W: Write>(path: &Path, out: W) -> io::Result<W> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;

    let mut builder = tar::Builder::new(out);
    builder.follow_symlinks(false);

    if path.is_dir() {
        builder.append_dir_all(name, path)?;
    } else {
        builder.append_path_with_name(path, name)?;
    }

    builder.into_inner()
}

/// Blocking writer feeding fixed-size chunks into an upload queue.
struct ChunkWriter {
    tx: mpsc::Sender<Vec<u8>>,
    buf: Vec<u8>,
}

impl ChunkWriter {
    fn new(tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
        }
    }
}

impl Write for ChunkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.flush()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::replace(&mut self.buf, Vec::with_capacity(CHUNK_SIZE));
        self.tx
            .blocking_send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "upload stopped"))
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn run_local(&self, command: &str) -> Result<CommandOutput, TransportError> {
        run_shell(command).await
    }

    async fn run_remote(&self, command: &str) -> Result<CommandOutput, TransportError> {
        self.session()
            .await?
            .exec(command)
            .await
            .context(SshSnafu {
                host: &self.config.host,
            })
    }

    async fn run_remote_streaming(
        &self,
        command: &str,
        sink: &mut (dyn for<'a> FnMut(&'a [u8]) + Send),
    ) -> Result<CommandOutput, TransportError> {
        self.session()
            .await?
            .exec_streaming(command, sink)
            .await
            .context(SshSnafu {
                host: &self.config.host,
            })
    }

    async fn copy_to_remote(
        &self,
        local: &Path,
        remote_dir: &str,
    ) -> Result<CommandOutput, TransportError> {
        let session = self.session().await?;

        tracing::debug!(
            "Uploading {} to {}:{}",
            local.display(),
            self.config.host,
            remote_dir
        );

        let (tx, rx) = mpsc::channel(UPLOAD_QUEUE);
        let path: PathBuf = local.to_path_buf();
        let packer = tokio::task::spawn_blocking(move || {
            pack(&path, ChunkWriter::new(tx))?.flush()
        });

        let dir = quote_path(remote_dir.trim_end_matches('/'));
        let uploaded = session
            .exec_with_stdin(&format!("mkdir -p {dir} && tar -xf - -C {dir}"), rx)
            .await
            .context(SshSnafu {
                host: &self.config.host,
            });
        let packed = packer
            .await
            .map_err(io::Error::other)
            .and_then(|packed| packed)
            .context(ArchiveSnafu { path: local });

        let output = uploaded?;
        packed?;
        Ok(output)
    }

    async fn close(&self) -> Result<(), TransportError> {
        if let Some(session) = self.session.get() {
            session.disconnect().await.context(SshSnafu {
                host: &self.config.host,
            })?;
        }
        Ok(())
    }
}
