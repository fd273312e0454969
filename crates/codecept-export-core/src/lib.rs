//! # codecept-export-core
//!
//! Turns browser tests recorded by a Selenium-IDE style recorder into PHP
//! source for the Codeception acceptance-testing framework.
//!
//! The heart of the crate is the command emission engine: a [`Registry`] of
//! per-command emitters, each converting one recorded step into PHP
//! statements, plus the indentation bookkeeping that nested control flow
//! needs. Around it sit the pieces a complete exporter needs.
//!
//! ## Modules
//!
//! - [`command`] - Recorded commands, tests, suites and projects
//! - [`preprocess`] - Escaping and `${var}` interpolation of arguments
//! - [`locator`] - Locator and option-selector translation
//! - [`emitter`] - The emitter trait and registry
//! - [`commands`] - Built-in emitters for every supported command
//! - [`fragment`] - Emitter output and the level tracker
//! - [`hook`] - File and class boilerplate
//! - [`assembler`] - Builds whole `Cest` class files
//! - [`plugin`] - Recorder message handling
//! - [`ipc`] - Unix socket transport
//! - [`config`] - Persistent settings
//!
//! ## Example
//!
//! ```
//! use codecept_export_core::assembler::{Assembler, RenderOptions};
//! use codecept_export_core::command::{Command, Test};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let test = Test::new("search", vec![
//!     Command::new("open", "/", ""),
//!     Command::new("type", "name=q", "rust${KEY_ENTER}"),
//! ]);
//! let file = Assembler::new()
//!     .emit_test(&test, &[], &RenderOptions::new("https://example.com"))
//!     .await
//!     .unwrap();
//! assert_eq!(file.filename, "SearchCest.php");
//! assert!(file.body.contains("$i->amOnUrl('https://example.com/');"));
//! # });
//! ```
//!
//! [`Registry`]: emitter::Registry

pub mod assembler;
pub mod command;
pub mod commands;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fragment;
pub mod hook;
pub mod ipc;
pub mod locator;
pub mod naming;
pub mod plugin;
pub mod preprocess;

pub use error::ExportError;
