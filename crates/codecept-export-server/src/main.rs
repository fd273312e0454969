use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use codecept_export_core::config::ExportConfig;
use codecept_export_core::ipc::{logs_dir, IpcServer};
use codecept_export_core::plugin::{Plugin, PluginManifest};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

mod registration;
use registration::Registrar;

#[derive(Parser)]
#[command(name = "codecept-export-server")]
#[command(about = "Answers recorder export requests with PHP Codeception classes")]
#[command(version)]
struct Args {
    /// Session name for IPC socket
    #[arg(short, long, default_value = "default", env = "CODECEPT_EXPORT_SESSION")]
    session: String,

    /// Socket of the recorder to register with (no registration if unset)
    #[arg(long, env = "CODECEPT_EXPORT_HOST_SOCKET")]
    host_socket: Option<PathBuf>,

    /// Interval between recorder health checks, in milliseconds
    #[arg(long)]
    health_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::never(logs_dir(), "codecept-export-server.log");
    tracing_subscriber::fmt()
        .with_writer(file_appender)
        .with_ansi(false)
        .init();

    info!(session = %args.session, "Starting codecept-export-server");

    let mut config = ExportConfig::load();
    if args.health_interval_ms.is_some() {
        config.health_interval_ms = args.health_interval_ms;
    }
    let host_socket = args.host_socket.or(config.host_socket.clone());

    let registration = match host_socket {
        Some(path) => {
            info!(host = %path.display(), interval = ?config.health_interval(), "registering with recorder");
            Some(Registrar::new(path, PluginManifest::default()).spawn(config.health_interval()))
        }
        None => {
            warn!("no recorder socket configured, skipping registration");
            None
        }
    };

    let server = IpcServer::new(Arc::new(Plugin::default()), &args.session);
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                info!(error = %e, "Accept loop exited");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
    }

    info!("Cleaning up");
    if let Some(handle) = registration {
        handle.stop().await;
    }
    // Dropping the server removes its socket file.
    drop(server);
    info!("Server stopped");

    Ok(())
}
