//! CLI error type.

use std::path::PathBuf;

use thiserror::Error;
use zonemap::config::ConfigError;
use zonemap::coord::CoordError;
use zonemap::logging::LoggingError;
use zonemap::FetchError;

/// Errors surfaced to the user by `zonemap` commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid view: {0}")]
    View(#[from] CoordError),

    #[error("Data source error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
