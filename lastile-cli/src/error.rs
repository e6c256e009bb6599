//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use lastile::buffer::MissingBufferMarkError;
use lastile::config::ConfigFileError;
use lastile::raster::FetchError;
use lastile::TileError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to load or save the configuration file
    ConfigFile(ConfigFileError),
    /// A tile operation failed
    Tile(TileError),
    /// Some tiles of a batch failed
    BatchFailed { failed: usize, total: usize },
    /// The compared files are not identical
    FilesDiffer { differing: usize, percentage: f64 },
    /// The file holds no point to work with
    EmptyTile(PathBuf),
    /// Failed to create the HTTP client
    HttpClient(FetchError),
    /// Failed to serialize a command result
    Serialize(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// File system error
    Io { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Tile(TileError::MissingBufferMark(MissingBufferMarkError)) => {
                eprintln!();
                eprintln!("Only files written by 'lastile add-buffer' carry a buffer.");
            }
            CliError::Tile(TileError::Grid(_)) | CliError::EmptyTile(_) => {
                eprintln!();
                eprintln!("Check the [grid] section of the configuration:");
                eprintln!("  lastile config path");
            }
            CliError::BatchFailed { .. } => {
                eprintln!();
                eprintln!("See the log file for the error of each tile.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Tile(e) => write!(f, "{}", e),
            CliError::BatchFailed { failed, total } => {
                write!(f, "{} of {} tiles failed", failed, total)
            }
            CliError::FilesDiffer {
                differing,
                percentage,
            } => write!(
                f,
                "Files differ: {} points ({:.2}%)",
                differing, percentage
            ),
            CliError::EmptyTile(path) => write!(f, "No points in '{}'", path.display()),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Serialize(msg) => write!(f, "Failed to serialize result: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Io { path, error } => write!(f, "'{}': {}", path.display(), error),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Tile(e) => Some(e),
            CliError::HttpClient(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tile(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}
