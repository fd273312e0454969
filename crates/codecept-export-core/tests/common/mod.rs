//! Shared test helpers for codecept-export-core integration tests.
//!
//! Provides a recorded fixture project and a harness that serves a
//! [`Plugin`] over a real Unix socket in a temporary directory.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use codecept_export_core::command::{Command, Project, Suite, Test};
use codecept_export_core::ipc::{IpcClient, IpcServer};
use codecept_export_core::plugin::Plugin;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A small project: a login test, a checkout test that runs login, and a
/// suite holding both.
pub fn fixture_project() -> Project {
    let login = Test {
        id: "t-login".into(),
        name: "Login".into(),
        commands: vec![
            Command::new("open", "/login", ""),
            Command::new("type", "id=user", "alice"),
            Command::new("type", "id=pass", "secret${KEY_ENTER}"),
            Command::new("assertText", "css=.welcome", "Hello alice"),
        ],
    };
    let checkout = Test {
        id: "t-checkout".into(),
        name: "Checkout".into(),
        commands: vec![
            Command::new("run", "Login", ""),
            Command::new("storeText", "id=total", "total"),
            Command::new("if", "${total} > 0", ""),
            Command::new("click", "id=pay", ""),
            Command::new("else", "", ""),
            Command::new("echo", "nothing to pay", ""),
            Command::new("end", "", ""),
        ],
    };
    Project {
        id: "p1".into(),
        name: "shop".into(),
        url: "https://shop.test".into(),
        suites: vec![Suite {
            id: "s1".into(),
            name: "Shop flows".into(),
            tests: vec!["t-login".into(), "t-checkout".into()],
            ..Suite::default()
        }],
        tests: vec![login, checkout],
        ..Project::default()
    }
}

// ---------------------------------------------------------------------------
// TestHarness: socket server fixture
// ---------------------------------------------------------------------------

/// An [`IpcServer`] running on a socket inside a temporary directory.
pub struct TestHarness {
    pub socket: PathBuf,
    _dir: tempfile::TempDir,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl TestHarness {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("plugin.sock");
        let server = IpcServer::at_path(Arc::new(Plugin::default()), socket.clone());
        let handle = tokio::spawn(async move {
            let _ = server.run().await;
        });
        wait_for_socket(&socket).await;
        Self {
            socket,
            _dir: dir,
            _server_handle: handle,
        }
    }

    pub async fn connect_client(&self) -> IpcClient {
        IpcClient::connect_path(&self.socket).await.unwrap()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}

/// Polls until the socket file exists, failing after two seconds.
pub async fn wait_for_socket(path: &std::path::Path) {
    for _ in 0..200 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("socket {} never appeared", path.display());
}
