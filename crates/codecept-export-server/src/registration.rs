//! Keeps the recorder aware of the exporter.
//!
//! The recorder forgets plugins when it restarts, so the server polls its
//! `/health` endpoint and re-sends the `/register` manifest whenever the
//! answer is missing or negative.

use std::path::{Path, PathBuf};
use std::time::Duration;

use codecept_export_core::ipc::{IpcClient, IpcError};
use codecept_export_core::plugin::{HostRequest, PluginManifest};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, info, warn, Instrument};

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The recorder answered the health check positively.
    Healthy,
    /// The manifest was sent to the recorder.
    Registered,
}

/// Handle for a running registration poller.
pub struct RegistrationHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
}

impl RegistrationHandle {
    /// Stops the poller and waits for it to finish.
    pub async fn stop(self) {
        self.cancel_token.cancel();
        let _ = self.join_handle.await;
    }
}

pub struct Registrar {
    host_socket: PathBuf,
    manifest: PluginManifest,
}

impl Registrar {
    pub fn new(host_socket: impl Into<PathBuf>, manifest: PluginManifest) -> Self {
        Self {
            host_socket: host_socket.into(),
            manifest,
        }
    }

    /// Spawns the poller. The first check runs after one `interval`.
    pub fn spawn(self, interval: Duration) -> RegistrationHandle {
        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let join_handle = tokio::spawn(async move {
            self.run_loop(interval, token_clone).await;
        });

        RegistrationHandle {
            cancel_token,
            join_handle,
        }
    }

    async fn run_loop(self, interval: Duration, cancel_token: CancellationToken) {
        let mut consecutive_errors: u32 = 0;

        loop {
            let sleep_duration = backoff_interval(interval, consecutive_errors);

            tokio::select! {
                _ = cancel_token.cancelled() => {
                    break;
                }
                _ = tokio::time::sleep(sleep_duration) => {
                    let span = debug_span!("registration_poll");
                    match self.check().instrument(span).await {
                        Ok(_) => consecutive_errors = 0,
                        Err(e) => {
                            if consecutive_errors == 0 {
                                warn!(error = %e, host = %self.host_socket.display(), "recorder unreachable");
                            }
                            consecutive_errors = consecutive_errors.saturating_add(1);
                        }
                    }
                }
            }
        }
    }

    /// Runs one health check, registering when it fails.
    ///
    /// # Errors
    ///
    /// Returns the error of the registration attempt. A failed health check
    /// alone is not an error.
    pub async fn check(&self) -> Result<Outcome, IpcError> {
        match health(&self.host_socket).await {
            Ok(reply) if is_healthy(&reply) => return Ok(Outcome::Healthy),
            Ok(reply) => debug!(%reply, "recorder does not know the plugin"),
            Err(e) => debug!(error = %e, "health check failed"),
        }

        let mut client = IpcClient::connect_path(&self.host_socket).await?;
        let reply = client
            .send(&HostRequest::register(self.manifest.clone()))
            .await?;
        info!(name = %self.manifest.name, %reply, "registered with recorder");
        Ok(Outcome::Registered)
    }
}

async fn health(host_socket: &Path) -> Result<Value, IpcError> {
    let mut client = IpcClient::connect_path(host_socket).await?;
    client.send(&HostRequest::health()).await
}

fn is_healthy(reply: &Value) -> bool {
    !matches!(reply, Value::Null | Value::Bool(false))
}

/// Doubles the interval with each consecutive error, capped at 30 seconds.
fn backoff_interval(base: Duration, consecutive_errors: u32) -> Duration {
    const MAX_BACKOFF: Duration = Duration::from_secs(30);
    let multiplier = 1u32.checked_shl(consecutive_errors).unwrap_or(u32::MAX);
    std::cmp::min(base.saturating_mul(multiplier), MAX_BACKOFF)
}
