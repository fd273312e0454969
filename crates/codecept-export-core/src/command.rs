//! Recorded test data: commands, tests, suites and projects.
//!
//! These types mirror the JSON written by the browser recorder (`.side`
//! project files and the `options` payload of an export request). They are
//! read-only inputs to the emission engine; nothing in this crate mutates
//! them.
//!
//! # Example
//!
//! ```
//! use codecept_export_core::command::Command;
//!
//! let command = Command::new("click", "css=#login", "");
//! assert_eq!(command.command, "click");
//! assert!(!command.is_disabled());
//! ```

use serde::{Deserialize, Serialize};

/// Default time the generated program waits for a newly opened window, in
/// milliseconds.
pub const DEFAULT_WINDOW_TIMEOUT_MS: u64 = 2000;

/// One recorded test step.
///
/// Arguments are positional: every emitter receives `target` first and
/// `value` second, and interprets them according to its own command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Command {
    /// Recorder-assigned identifier.
    pub id: String,

    /// Free-form description attached to the step.
    pub comment: String,

    /// The command name (e.g. `click`, `assertText`).
    pub command: String,

    /// First positional argument, usually a locator.
    pub target: String,

    /// Alternative locators captured by the recorder as `[locator, strategy]`
    /// pairs. Kept for round-tripping; emission only uses `target`.
    pub targets: Vec<Vec<String>>,

    /// Second positional argument.
    pub value: String,

    /// Whether executing this step opens a new browser window or tab.
    pub opens_window: bool,

    /// Variable that receives the handle of the window opened by this step.
    pub window_handle_name: String,

    /// How long to wait for the new window, in milliseconds.
    pub window_timeout: Option<u64>,
}

impl Command {
    /// Creates a command with the given name and positional arguments.
    pub fn new(command: impl Into<String>, target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target: target.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Marks the command as opening a window whose handle is stored in `handle_name`.
    pub fn opening_window(mut self, handle_name: impl Into<String>) -> Self {
        self.opens_window = true;
        self.window_handle_name = handle_name.into();
        self
    }

    /// Returns true for steps the user disabled in the recorder (`//click`).
    pub fn is_disabled(&self) -> bool {
        self.command.starts_with("//")
    }

    /// The window timeout with the recorder default applied.
    pub fn window_timeout_ms(&self) -> u64 {
        self.window_timeout.unwrap_or(DEFAULT_WINDOW_TIMEOUT_MS)
    }
}

/// An ordered list of commands with a name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Test {
    pub id: String,
    pub name: String,
    pub commands: Vec<Command>,
}

impl Test {
    pub fn new(name: impl Into<String>, commands: Vec<Command>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            commands,
        }
    }
}

/// A named group of tests, referenced by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suite {
    pub id: String,
    pub name: String,
    pub persist_session: bool,
    pub parallel: bool,
    pub timeout: Option<u64>,
    /// Ids of the tests in this suite, in execution order.
    pub tests: Vec<String>,
}

/// A whole recorder project (the contents of a `.side` file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub version: String,
    pub name: String,
    /// Base URL the recording was made against.
    pub url: String,
    pub tests: Vec<Test>,
    pub suites: Vec<Suite>,
    pub urls: Vec<String>,
}

impl Project {
    /// Finds a test by id, falling back to a match on its name.
    pub fn find_test(&self, key: &str) -> Option<&Test> {
        find_test(&self.tests, key)
    }

    /// Finds a suite by name or id.
    pub fn find_suite(&self, key: &str) -> Option<&Suite> {
        self.suites.iter().find(|s| s.name == key || s.id == key)
    }
}

/// Finds a test in `tests` by id, falling back to its name.
pub fn find_test<'a>(tests: &'a [Test], key: &str) -> Option<&'a Test> {
    tests
        .iter()
        .find(|t| t.id == key)
        .or_else(|| tests.iter().find(|t| t.name == key))
}
