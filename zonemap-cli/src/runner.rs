//! Shared setup for commands that run the session.
//!
//! A [`CliRunner`] loads the configuration, installs logging and owns the
//! Tokio runtime the command executes on.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::info;
use zonemap::config::ConfigFile;
use zonemap::logging::{init_logging, LoggingGuard};
use zonemap::overpass::{EntitySource, OverpassSource, ReqwestClient, StaticSource};

use crate::error::CliError;

/// Config, logging and runtime for one command invocation.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
    runtime: Option<Runtime>,
}

impl CliRunner {
    /// Load the user configuration and initialise logging and the runtime.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(&config.logging)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("zonemap")
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            config,
            _logging: logging,
            runtime: Some(runtime),
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run with the effective settings.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            endpoint = %self.config.fetch.endpoint,
            buffer_radius_m = self.config.zones.buffer_radius_m,
            buffer = self.config.pipeline.buffer,
            dissolve = self.config.pipeline.dissolve,
            "zonemap starting"
        );
    }

    /// Saved Overpass response when `input` is given, the live API otherwise.
    pub fn entity_source(&self, input: Option<&Path>) -> Result<Arc<dyn EntitySource>, CliError> {
        match input {
            Some(path) => {
                info!(path = %path.display(), "Reading entities from file");
                Ok(Arc::new(StaticSource::from_file(path)?))
            }
            None => {
                let fetch = &self.config.fetch;
                let client = ReqwestClient::with_timeout(fetch.timeout_secs)?;
                Ok(Arc::new(OverpassSource::new(
                    client,
                    fetch.endpoint.clone(),
                    fetch.timeout_secs,
                )))
            }
        }
    }

    /// Run `future` to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        match &self.runtime {
            Some(runtime) => runtime.block_on(future),
            None => unreachable!("runtime is only taken on drop"),
        }
    }
}

impl Drop for CliRunner {
    fn drop(&mut self) {
        // A pending stdin read would otherwise block shutdown
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
