//! Command-line exporter for recorded browser tests.
//!
//! Converts `.side` projects written by the recorder into PHP Codeception
//! `Cest` classes, either directly or through a running export server.
//!
//! # Usage
//!
//! ```bash
//! # Export one test into ./LoginCest.php
//! codecept-export export shop.side --test Login
//!
//! # Export a suite, printing the class instead of writing it
//! codecept-export export shop.side --suite "Smoke" --stdout
//!
//! # Export every test against a different base URL
//! codecept-export export shop.side --url https://staging.shop.test --out-dir tests/acceptance
//!
//! # List the recorder commands that can be exported
//! codecept-export commands
//!
//! # Send an export request (recorder `options` JSON) to a running server
//! codecept-export -s my-session send options.json
//! ```

mod converter;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use codecept_export_core::assembler::{ExportedFile, RenderOptions};
use codecept_export_core::config::ExportConfig;
use codecept_export_core::emitter::Registry;
use codecept_export_core::ipc::IpcClient;
use codecept_export_core::plugin::{ExportOptions, PluginResponse};
use codecept_export_core::ExportError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use converter::{Selection, SideConverter};

/// Export recorded browser tests as PHP Codeception classes.
#[derive(Parser)]
#[command(name = "codecept-export")]
#[command(about = "Export recorded browser tests as PHP Codeception classes")]
#[command(version)]
struct Cli {
    /// Session name of the export server (for `send`)
    #[arg(short, long, default_value = "default", env = "CODECEPT_EXPORT_SESSION")]
    session: String,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a .side project file into Cest classes
    Export {
        /// Path to the .side project ("-" reads stdin)
        project: PathBuf,
        /// Export only the test with this name or id
        #[arg(short, long, conflicts_with = "suite")]
        test: Option<String>,
        /// Export the suite with this name or id as one class
        #[arg(short = 'S', long)]
        suite: Option<String>,
        /// Base URL for relative `open` targets (defaults to the project URL)
        #[arg(short, long, env = "CODECEPT_EXPORT_URL")]
        url: Option<String>,
        /// Directory the class files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Print the generated code instead of writing files
        #[arg(long)]
        stdout: bool,
        /// Prefix every step with a comment naming the recorded command
        #[arg(long)]
        origin_tracing: bool,
        /// Render step descriptions as comments
        #[arg(long)]
        description_comments: bool,
    },

    /// List the recorder commands that can be exported
    Commands,

    /// Send recorder export options to a running server and print the result
    Send {
        /// Path to a JSON file with the export options ("-" reads stdin)
        options: PathBuf,
        /// Write the class into this directory instead of printing it
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    Connection(String),
    ExportFailed(String),
    Protocol(String),
    Io(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::ExportFailed(_) => ExitCode::from(1),
            CliError::Connection(_) => ExitCode::from(2),
            CliError::Protocol(_) => ExitCode::from(3),
            CliError::Io(_) => ExitCode::from(4),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Connection(msg) => write!(f, "Connection error: {}", msg),
            CliError::ExportFailed(msg) => write!(f, "Export failed: {}", msg),
            CliError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            CliError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Io(e) => CliError::Io(e.to_string()),
            other => CliError::ExportFailed(other.to_string()),
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Export {
            project,
            test,
            suite,
            url,
            out_dir,
            stdout,
            origin_tracing,
            description_comments,
        } => {
            let project = if project == Path::new("-") {
                SideConverter::load_stdin()?
            } else {
                SideConverter::load_file(&project)?
            };
            let base_url = url
                .or_else(|| (!project.url.is_empty()).then(|| project.url.clone()))
                .or_else(|| ExportConfig::load().default_base_url)
                .unwrap_or_default();
            debug!(base_url = %base_url, "resolved base url");

            let selection = match (test, suite) {
                (Some(test), _) => Selection::Test(test),
                (None, Some(suite)) => Selection::Suite(suite),
                (None, None) => Selection::AllTests,
            };
            let options = RenderOptions {
                base_url,
                origin_tracing,
                description_comments,
            };
            let files = SideConverter::default()
                .convert(&project, &selection, &options)
                .await?;

            for file in &files {
                if stdout {
                    print!("{}", file.body);
                } else {
                    let path = write_file(&out_dir, file)?;
                    if !cli.quiet {
                        println!("{}", path.display());
                    }
                }
            }
            Ok(())
        }
        Command::Commands => {
            for name in Registry::with_builtins().names() {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Send { options, out_dir } => {
            let content = if options == Path::new("-") {
                let mut buf = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
                    .map_err(|e| CliError::Io(e.to_string()))?;
                buf
            } else {
                std::fs::read_to_string(&options).map_err(|e| {
                    CliError::Io(format!("Failed to read {}: {}", options.display(), e))
                })?
            };
            let options: ExportOptions = serde_json::from_str(&content)
                .map_err(|e| CliError::ExportFailed(format!("Invalid export options: {}", e)))?;

            let mut client = IpcClient::connect(&cli.session).await.map_err(|e| {
                CliError::Connection(format!(
                    "Failed to connect to session '{}': {}",
                    cli.session, e
                ))
            })?;
            let response = client
                .export(&options)
                .await
                .map_err(|e| CliError::Protocol(format!("Failed to send request: {}", e)))?;

            match response {
                Some(PluginResponse::Exported { body, filename }) => {
                    match out_dir {
                        Some(dir) => {
                            let path = write_file(&dir, &ExportedFile { filename, body })?;
                            if !cli.quiet {
                                println!("{}", path.display());
                            }
                        }
                        None => print!("{}", body),
                    }
                    Ok(())
                }
                Some(PluginResponse::Failed { error, .. }) => Err(CliError::ExportFailed(error)),
                None => Err(CliError::Protocol(
                    "Server did not treat the message as an export request".to_string(),
                )),
            }
        }
    }
}

fn write_file(dir: &Path, file: &ExportedFile) -> Result<PathBuf, CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;
    let path = dir.join(&file.filename);
    std::fs::write(&path, &file.body)
        .map_err(|e| CliError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    Ok(path)
}
