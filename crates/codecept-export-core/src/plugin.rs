//! Recorder plugin protocol.
//!
//! The recorder asks plugins for code with a message of the form
//! `{action: "export", entity: "vendor", language: "php", options}` and
//! expects `{body, filename}` back, or `{error, status: "fatal"}` when the
//! export failed. Messages that are not export requests for this plugin get
//! no answer. Plugins announce themselves to the recorder with a
//! [`HostRequest::register`] carrying the [`PluginManifest`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::assembler::{Assembler, ExportedFile, RenderOptions};
use crate::command::{Project, Suite, Test};
use crate::error::ExportError;

/// Language label shown by the recorder's export dialog.
pub const DISPLAY_NAME: &str = "PHP Codeception";

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "PHP Codeception Code Export";

/// Payload of an export request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Base URL for relative `open` targets.
    pub url: String,
    pub test: Option<Test>,
    pub suite: Option<Suite>,
    /// Tests available to suites and `run` commands.
    pub tests: Vec<Test>,
    pub project: Option<Project>,
    pub enable_origin_tracing: bool,
    pub enable_description_as_comment: bool,
    /// Browser settings for `_before`. Accepted for compatibility; the
    /// generated hooks do not use them.
    pub before_each_options: Option<Value>,
}

impl ExportOptions {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            base_url: self.url.clone(),
            origin_tracing: self.enable_origin_tracing,
            description_comments: self.enable_description_as_comment,
        }
    }

    /// The tests suites and `run` commands resolve against: `tests` if
    /// given, otherwise the project's.
    pub fn test_pool(&self) -> &[Test] {
        match &self.project {
            Some(project) if self.tests.is_empty() => &project.tests,
            _ => &self.tests,
        }
    }
}

/// Answer to an export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginResponse {
    Exported { body: String, filename: String },
    Failed { error: String, status: String },
}

impl PluginResponse {
    pub fn fatal(error: impl ToString) -> Self {
        PluginResponse::Failed {
            error: error.to_string(),
            status: "fatal".to_string(),
        }
    }

    /// Builds the success answer. The generator marker line is dropped.
    pub fn exported(file: ExportedFile) -> Self {
        let file = file.without_marker();
        PluginResponse::Exported {
            body: file.body,
            filename: file.filename,
        }
    }
}

/// What the plugin exports, keyed by entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTargets {
    pub vendor: Vec<BTreeMap<String, String>>,
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub exports: ExportTargets,
}

impl Default for PluginManifest {
    fn default() -> Self {
        let php = BTreeMap::from([("php".to_string(), DISPLAY_NAME.to_string())]);
        Self {
            name: PLUGIN_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            exports: ExportTargets { vendor: vec![php] },
        }
    }
}

/// A request from the plugin to the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRequest {
    pub uri: String,
    pub verb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PluginManifest>,
}

impl HostRequest {
    pub fn health() -> Self {
        Self {
            uri: "/health".to_string(),
            verb: "get".to_string(),
            payload: None,
        }
    }

    pub fn register(manifest: PluginManifest) -> Self {
        Self {
            uri: "/register".to_string(),
            verb: "post".to_string(),
            payload: Some(manifest),
        }
    }
}

/// Handles recorder messages with an [`Assembler`].
#[derive(Clone, Default)]
pub struct Plugin {
    assembler: Assembler,
}

impl Plugin {
    pub fn new(assembler: Assembler) -> Self {
        Self { assembler }
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// Exports the suite named in `options`, or its test when there is no
    /// suite.
    pub async fn export(&self, options: &ExportOptions) -> Result<ExportedFile, ExportError> {
        let render = options.render_options();
        match (&options.suite, &options.test) {
            (Some(suite), _) => {
                self.assembler
                    .emit_suite(suite, options.test_pool(), &render)
                    .await
            }
            (None, Some(test)) => {
                self.assembler
                    .emit_test(test, options.test_pool(), &render)
                    .await
            }
            (None, None) => Err(ExportError::NothingToExport),
        }
    }

    /// Answers `message`, or returns `None` when it is not an export
    /// request for this plugin.
    pub async fn handle(&self, message: &Value) -> Option<PluginResponse> {
        if !is_export_request(message) {
            debug!("ignoring message that is not a php export request");
            return None;
        }
        let span = info_span!("export_request", request_id = %Uuid::new_v4());
        async {
            let options = match serde_json::from_value::<ExportOptions>(message["options"].clone()) {
                Ok(options) => options,
                Err(e) => {
                    warn!(error = %e, "malformed export options");
                    return PluginResponse::fatal(ExportError::Json(e));
                }
            };
            match self.export(&options).await {
                Ok(file) => {
                    debug!(filename = %file.filename, "export succeeded");
                    PluginResponse::exported(file)
                }
                Err(e) => {
                    warn!(error = %e, "export failed");
                    PluginResponse::fatal(e)
                }
            }
        }
        .instrument(span)
        .await
        .into()
    }
}

fn is_export_request(message: &Value) -> bool {
    message["action"] == "export"
        && message["entity"] == "vendor"
        && message["language"] == "php"
        && message
            .get("options")
            .map_or(false, |o| !o.is_null() && o != &Value::Bool(false))
}
