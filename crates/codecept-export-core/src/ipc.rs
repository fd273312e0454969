//! Unix socket transport for recorder messages.
//!
//! Messages travel as newline-delimited JSON. The [`IpcServer`] answers every
//! line it receives with exactly one line: the [`PluginResponse`] for export
//! requests, or `null` for anything else. [`IpcClient`] is the other end,
//! used by the CLI's `send` command and by the server to talk to the
//! recorder host.
//!
//! # Socket Location
//!
//! Sockets are created in `~/.codecept-export/` with the naming pattern
//! `codecept_export_{session_name}.sock`. Use [`socket_path`] to get the path
//! for a session.
//!
//! # Example
//!
//! ```no_run
//! use codecept_export_core::ipc::IpcClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = IpcClient::connect("default").await.unwrap();
//!     let reply = client.send(&json!({"uri": "/health", "verb": "get"})).await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::plugin::{ExportOptions, Plugin, PluginResponse};

/// Errors that can occur during IPC operations.
#[derive(Error, Debug)]
pub enum IpcError {
    /// An I/O error occurred (connection, read, write).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer closed the connection before answering.
    #[error("Connection closed before a reply was received")]
    Closed,
}

/// Returns the codecept-export directory path (`~/.codecept-export/`).
///
/// Creates the directory if it doesn't exist. Falls back to the system
/// temporary directory when there is no home directory.
pub fn codecept_dir() -> PathBuf {
    let dir = dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".codecept-export");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Returns the log directory (`~/.codecept-export/logs/`), creating it if needed.
pub fn logs_dir() -> PathBuf {
    let dir = codecept_dir().join("logs");
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Returns the Unix socket path for a session
/// (e.g. `~/.codecept-export/codecept_export_default.sock`).
pub fn socket_path(session_name: &str) -> PathBuf {
    codecept_dir().join(format!("codecept_export_{}.sock", session_name))
}

/// Unix socket server answering recorder messages with a [`Plugin`].
///
/// The socket file is removed when the server is dropped.
pub struct IpcServer {
    plugin: Arc<Plugin>,
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a server for `session_name` (not yet running).
    pub fn new(plugin: Arc<Plugin>, session_name: &str) -> Self {
        Self::at_path(plugin, socket_path(session_name))
    }

    /// Creates a server bound to an explicit socket path.
    pub fn at_path(plugin: Arc<Plugin>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            plugin,
            socket_path: socket_path.into(),
        }
    }

    /// Binds the socket and serves clients until an accept fails.
    ///
    /// Any existing socket file at the path is removed before binding. Each
    /// client is handled on its own task, so slow exports do not block other
    /// connections.
    ///
    /// # Errors
    ///
    /// - [`IpcError::Io`] if the socket cannot be bound or an accept fails
    pub async fn run(&self) -> Result<(), IpcError> {
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "failed to remove existing socket");
            }
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!(path = %self.socket_path.display(), "listening");

        loop {
            let (stream, _) = listener.accept().await?;
            debug!("client connected");
            let plugin = self.plugin.clone();
            tokio::spawn(async move {
                if let Err(e) = Self::handle_client(stream, plugin).await {
                    warn!(error = %e, "client error");
                }
            });
        }
    }

    async fn handle_client(stream: UnixStream, plugin: Arc<Plugin>) -> Result<(), IpcError> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;
            if n == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let reply = match serde_json::from_str::<Value>(line.trim()) {
                Ok(message) => match plugin.handle(&message).await {
                    Some(response) => serde_json::to_value(response)?,
                    None => Value::Null,
                },
                Err(e) => serde_json::to_value(PluginResponse::fatal(format!("Invalid JSON: {}", e)))?,
            };

            let json = serde_json::to_string(&reply)? + "\n";
            writer.write_all(json.as_bytes()).await?;
            writer.flush().await?;
        }
        debug!("client disconnected");
        Ok(())
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        std::fs::remove_file(&self.socket_path).ok();
    }
}

/// Unix socket client speaking the newline-delimited JSON protocol.
pub struct IpcClient {
    stream: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
}

impl IpcClient {
    /// Connects to the server for `session_name`.
    ///
    /// # Errors
    ///
    /// - [`IpcError::Io`] if the connection fails (e.g., server not running)
    pub async fn connect(session_name: &str) -> Result<Self, IpcError> {
        Self::connect_path(&socket_path(session_name)).await
    }

    pub async fn connect_path(path: &Path) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            stream: BufReader::new(reader),
            writer,
        })
    }

    /// Sends one message and waits for the one-line reply.
    ///
    /// # Errors
    ///
    /// - [`IpcError::Io`] if the send or receive fails
    /// - [`IpcError::Json`] if serialization or deserialization fails
    /// - [`IpcError::Closed`] if the peer hangs up without replying
    pub async fn send<T: Serialize + ?Sized>(&mut self, message: &T) -> Result<Value, IpcError> {
        let json = serde_json::to_string(message)? + "\n";
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.stream.read_line(&mut line).await? == 0 {
            return Err(IpcError::Closed);
        }
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Sends an export request built from `options`.
    ///
    /// Returns `None` if the server did not treat the message as an export
    /// request.
    pub async fn export(&mut self, options: &ExportOptions) -> Result<Option<PluginResponse>, IpcError> {
        let options = serde_json::to_value(options)?;
        let message = serde_json::json!({
            "action": "export",
            "entity": "vendor",
            "language": "php",
            "options": options,
        });
        let reply = self.send(&message).await?;
        Ok(serde_json::from_value(reply)?)
    }
}
