//! User configuration.
//!
//! Settings live in an INI file at `<config dir>/zonemap/config.ini`. A missing
//! file means defaults; unknown keys are ignored.
//!
//! # Example
//!
//! ```ignore
//! use zonemap::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::load()?;
//! ConfigKey::ZonesBufferRadius.set(&mut config, "200")?;
//! config.save()?;
//! ```

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, ConfigError, ConfigFile, FetchSettings, LoggingSettings,
    PipelineSettings, SessionSettings, ZoneSettings, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_LOG_LEVEL, LOG_LEVELS,
};
pub use keys::ConfigKey;
