use thiserror::Error;

use crate::emitter::EmitError;

/// Errors from exporting a whole test or suite.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A command in the exported tests could not be emitted.
    #[error(transparent)]
    Emit(#[from] EmitError),

    /// A suite entry or `run` target names a test that is not available.
    #[error("Test '{0}' not found")]
    MissingTest(String),

    /// A requested suite is not in the project.
    #[error("Suite '{0}' not found")]
    MissingSuite(String),

    /// A test or suite name has no characters usable in a PHP identifier.
    #[error("'{0}' cannot be turned into a class or method name")]
    InvalidName(String),

    /// An export request named neither a test nor a suite.
    #[error("Export request names neither a test nor a suite")]
    NothingToExport,

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
