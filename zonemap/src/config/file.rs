//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::coord::MAX_ZOOM;
use crate::geometry::{
    BufferEngine, GeometryExtractor, DEFAULT_BUFFER_RADIUS_M, DEFAULT_CIRCLE_SEGMENTS,
    DEFAULT_MARKER_RADIUS_M, DEFAULT_PRECISION,
};
use crate::marker::MarkerBuilder;
use crate::overpass::DEFAULT_OVERPASS_ENDPOINT;
use crate::session::{
    SessionConfig, DEFAULT_DEBOUNCE, DEFAULT_MIN_ZOOM, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH,
};

/// Default request timeout in seconds (also the Overpass query timeout).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 25;

/// Default log level when neither the file nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted log level names.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// `[fetch]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub min_zoom: u8,
}

/// `[zones]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSettings {
    pub buffer_radius_m: f64,
    pub marker_radius_m: f64,
    pub precision: u32,
    pub circle_segments: usize,
}

/// `[pipeline]` section: optional stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub buffer: bool,
    pub dissolve: bool,
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub debounce_ms: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    /// Directory for a log file; stderr only when unset.
    pub directory: Option<PathBuf>,
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub fetch: FetchSettings,
    pub zones: ZoneSettings,
    pub pipeline: PipelineSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            fetch: FetchSettings {
                endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
                timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
                min_zoom: DEFAULT_MIN_ZOOM,
            },
            zones: ZoneSettings {
                buffer_radius_m: DEFAULT_BUFFER_RADIUS_M,
                marker_radius_m: DEFAULT_MARKER_RADIUS_M,
                precision: DEFAULT_PRECISION,
                circle_segments: DEFAULT_CIRCLE_SEGMENTS,
            },
            pipeline: PipelineSettings {
                buffer: true,
                dissolve: true,
            },
            session: SessionSettings {
                debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
                viewport_width: DEFAULT_VIEWPORT_WIDTH,
                viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            },
            logging: LoggingSettings {
                level: DEFAULT_LOG_LEVEL.to_string(),
                directory: None,
            },
        }
    }
}

/// Path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zonemap")
}

impl ConfigFile {
    /// Load from [`config_file_path`]; defaults when the file is missing.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; defaults when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in super::ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to [`config_file_path`], creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }

    /// Render every key, skipping unset optional values.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Session tuning derived from `[fetch]`, `[session]` and `[pipeline]`.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            min_zoom: self.fetch.min_zoom,
            debounce: Duration::from_millis(self.session.debounce_ms),
            viewport_width: self.session.viewport_width,
            viewport_height: self.session.viewport_height,
            dissolve_enabled: self.pipeline.dissolve,
            ..SessionConfig::default()
        }
    }

    /// Marker builder derived from `[zones]` and `[pipeline]`.
    pub fn marker_builder(&self) -> MarkerBuilder {
        let buffer = self.pipeline.buffer.then(|| {
            BufferEngine::new(self.zones.buffer_radius_m)
                .with_segments(self.zones.circle_segments)
                .with_precision(self.zones.precision)
        });
        MarkerBuilder::new(GeometryExtractor::new(self.zones.marker_radius_m), buffer)
    }
}

// =============================================================================
// Value parsing
// =============================================================================

pub(super) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub(super) fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "not a number"))
}

pub(super) fn parse_positive_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = parse_number(key, value)?;
    if parsed.is_finite() && parsed > 0.0 {
        Ok(parsed)
    } else {
        Err(invalid(key, value, "must be a positive number"))
    }
}

pub(super) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

pub(super) fn parse_zoom(key: &str, value: &str) -> Result<u8, ConfigError> {
    let zoom: u8 = parse_number(key, value)?;
    if zoom > MAX_ZOOM {
        return Err(invalid(key, value, format!("must be at most {}", MAX_ZOOM)));
    }
    Ok(zoom)
}

pub(super) fn parse_level(key: &str, value: &str) -> Result<String, ConfigError> {
    let level = value.trim().to_lowercase();
    if LOG_LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(invalid(key, value, format!("expected one of {}", LOG_LEVELS.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("none.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.zones.buffer_radius_m = 200.0;
        config.pipeline.dissolve = false;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ConfigFile::parse(
            "[zones]\nbuffer_radius_m = 150\n\n[fetch]\nmin_zoom = 13\nunknown = 1\n",
        )
        .unwrap();
        assert_eq!(config.zones.buffer_radius_m, 150.0);
        assert_eq!(config.fetch.min_zoom, 13);
        assert_eq!(config.fetch.timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for text in [
            "[zones]\nbuffer_radius_m = -5\n",
            "[zones]\nprecision = many\n",
            "[fetch]\nmin_zoom = 40\n",
            "[pipeline]\nbuffer = maybe\n",
            "[logging]\nlevel = loud\n",
        ] {
            assert!(
                matches!(ConfigFile::parse(text), Err(ConfigError::InvalidValue { .. })),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_session_config_from_file() {
        let mut config = ConfigFile::default();
        config.session.debounce_ms = 120;
        config.pipeline.dissolve = false;
        let session = config.session_config();

        assert_eq!(session.debounce, Duration::from_millis(120));
        assert!(!session.dissolve_enabled);
        assert_eq!(session.min_zoom, DEFAULT_MIN_ZOOM);
    }

    #[test]
    fn test_buffer_stage_disabled() {
        let mut config = ConfigFile::default();
        assert!(config.marker_builder().buffers_enabled());
        config.pipeline.buffer = false;
        assert!(!config.marker_builder().buffers_enabled());
    }
}
