//! Command emitter registry.
//!
//! The [`Registry`] maps command names to [`CommandEmitter`] implementations
//! and is the dispatch surface of the engine. The built-in PHP Codeception
//! emitters are registered by [`Registry::with_builtins`]; callers can add or
//! replace emitters with [`Registry::register`].
//!
//! # Example
//!
//! ```
//! use codecept_export_core::command::Command;
//! use codecept_export_core::emitter::{EmitContext, Registry};
//! use codecept_export_core::fragment::Fragment;
//! use codecept_export_core::locator::WebDriverBy;
//!
//! let registry = Registry::with_builtins();
//! assert!(registry.can_emit("click"));
//!
//! let ctx = EmitContext::new("https://example.com", &WebDriverBy);
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let fragment = rt
//!     .block_on(registry.emit(&Command::new("click", "id=login", ""), &ctx))
//!     .unwrap();
//! assert_eq!(fragment, Fragment::statement("$i->click(WebDriverBy::id('login'));"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, debug_span, Instrument};

use crate::command::Command;
use crate::commands::Builtin;
use crate::fragment::{Block, Fragment, Line};
use crate::locator::LocatorTranslator;

/// Errors raised while emitting a single command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// No emitter is registered for the command name.
    #[error("Unknown command {0}")]
    UnsupportedCommand(String),

    /// The command's arguments are not one of the handled forms.
    #[error("{0}")]
    UnsupportedTarget(String),

    /// A collaborator (e.g. a locator translator) failed.
    #[error("Emission failed: {0}")]
    EmissionFailure(String),
}

/// Returns the syntax that reads stored variable `name`.
pub fn variable_lookup(name: &str) -> String {
    format!("$this->vars['{}']", name)
}

/// Returns the statement storing `value` into variable `name`, or an empty
/// string when `name` is empty.
pub fn variable_setter(name: &str, value: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!("{} = {};", variable_lookup(name), value)
    }
}

/// Per-run context handed to every emitter.
///
/// Holds the base URL for the current export run and the locator translator.
pub struct EmitContext<'a> {
    pub base_url: &'a str,
    locators: &'a dyn LocatorTranslator,
}

impl<'a> EmitContext<'a> {
    pub fn new(base_url: &'a str, locators: &'a dyn LocatorTranslator) -> Self {
        Self { base_url, locators }
    }

    /// Syntax reading stored variable `name`.
    pub fn lookup(&self, name: &str) -> String {
        variable_lookup(name)
    }

    /// Translates a preprocessed locator.
    pub async fn locator(&self, locator: &str) -> Result<String, EmitError> {
        self.locators.locator(locator).await
    }

    /// Translates a preprocessed option selector.
    pub async fn option(&self, selector: &str) -> Result<String, EmitError> {
        self.locators.option(selector).await
    }
}

/// Converts one command into a [`Fragment`].
#[async_trait]
pub trait CommandEmitter: Send + Sync {
    async fn emit(&self, command: &Command, ctx: &EmitContext<'_>) -> Result<Fragment, EmitError>;
}

/// Adapts a plain function into a [`CommandEmitter`].
pub struct FnEmitter<F>(pub F);

#[async_trait]
impl<F> CommandEmitter for FnEmitter<F>
where
    F: Fn(&Command) -> Result<Fragment, EmitError> + Send + Sync,
{
    async fn emit(&self, command: &Command, _ctx: &EmitContext<'_>) -> Result<Fragment, EmitError> {
        (self.0)(command)
    }
}

/// Mapping from command name to emitter.
#[derive(Clone)]
pub struct Registry {
    emitters: HashMap<String, Arc<dyn CommandEmitter>>,
}

impl Registry {
    /// Creates a registry with no emitters.
    pub fn empty() -> Self {
        Self {
            emitters: HashMap::new(),
        }
    }

    /// Creates a registry holding every built-in command.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for &(name, builtin) in Builtin::TABLE {
            registry.register(name, builtin);
        }
        registry
    }

    /// Registers `emitter` for `name`, replacing any existing one.
    pub fn register(&mut self, name: impl Into<String>, emitter: impl CommandEmitter + 'static) {
        self.emitters.insert(name.into(), Arc::new(emitter));
    }

    /// True if a command named `name` can be emitted.
    pub fn can_emit(&self, name: &str) -> bool {
        self.emitters.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.emitters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Emits `command`.
    ///
    /// Disabled steps render as a comment. Commands that open a window are
    /// wrapped with [`new_window_handling`].
    ///
    /// # Errors
    ///
    /// - [`EmitError::UnsupportedCommand`] if no emitter is registered
    /// - whatever the emitter itself returns
    pub async fn emit(&self, command: &Command, ctx: &EmitContext<'_>) -> Result<Fragment, EmitError> {
        if command.is_disabled() {
            return Ok(disabled_comment(command));
        }
        let emitter = self
            .emitters
            .get(&command.command)
            .ok_or_else(|| EmitError::UnsupportedCommand(command.command.clone()))?;

        let span = debug_span!("emit_command", command = %command.command);
        let fragment = emitter.emit(command, ctx).instrument(span).await?;
        debug!(command = %command.command, empty = fragment.is_empty(), "command emitted");

        if command.opens_window {
            Ok(new_window_handling(command, fragment))
        } else {
            Ok(fragment)
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn disabled_comment(command: &Command) -> Fragment {
    let mut text = format!("{} | {}", command.command, command.target);
    if !command.value.is_empty() {
        text.push_str(" | ");
        text.push_str(&command.value);
    }
    Fragment::statement(text.replace(['\r', '\n'], " "))
}

/// Wraps the fragment of a window-opening command so that the generated
/// program snapshots the window handles before the command and stores the
/// new window's handle afterwards.
pub fn new_window_handling(command: &Command, emitted: Fragment) -> Fragment {
    let (starting, ending) = match &emitted {
        Fragment::Block(b) => (b.starting_level_adjustment, b.ending_level_adjustment),
        Fragment::Statement(_) => (0, 0),
    };
    let mut lines = vec![
        Line::new(0, "$i->executeInSelenium(function (RemoteWebDriver $driver) {"),
        Line::new(1, "$this->vars['windowHandles'] = $driver->getWindowHandles();"),
        Line::new(0, "});"),
    ];
    lines.extend(emitted.into_lines());
    let wait = format!("$this->waitForWindow($i, {})", command.window_timeout_ms());
    let store = if command.window_handle_name.is_empty() {
        format!("{};", wait)
    } else {
        variable_setter(&command.window_handle_name, &wait)
    };
    lines.push(Line::new(0, store));
    Block {
        lines,
        starting_level_adjustment: starting,
        ending_level_adjustment: ending,
    }
    .into()
}
