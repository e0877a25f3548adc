//! Addressable configuration keys (`section.key`).

use std::path::PathBuf;
use std::str::FromStr;

use super::file::{
    invalid, parse_bool, parse_level, parse_number, parse_positive_f64, parse_zoom, ConfigError,
    ConfigFile,
};

/// A single setting of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    FetchEndpoint,
    FetchTimeout,
    FetchMinZoom,
    ZonesBufferRadius,
    ZonesMarkerRadius,
    ZonesPrecision,
    ZonesCircleSegments,
    PipelineBuffer,
    PipelineDissolve,
    SessionDebounceMs,
    SessionViewportWidth,
    SessionViewportHeight,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::FetchEndpoint,
            ConfigKey::FetchTimeout,
            ConfigKey::FetchMinZoom,
            ConfigKey::ZonesBufferRadius,
            ConfigKey::ZonesMarkerRadius,
            ConfigKey::ZonesPrecision,
            ConfigKey::ZonesCircleSegments,
            ConfigKey::PipelineBuffer,
            ConfigKey::PipelineDissolve,
            ConfigKey::SessionDebounceMs,
            ConfigKey::SessionViewportWidth,
            ConfigKey::SessionViewportHeight,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::FetchEndpoint | ConfigKey::FetchTimeout | ConfigKey::FetchMinZoom => {
                "fetch"
            }
            ConfigKey::ZonesBufferRadius
            | ConfigKey::ZonesMarkerRadius
            | ConfigKey::ZonesPrecision
            | ConfigKey::ZonesCircleSegments => "zones",
            ConfigKey::PipelineBuffer | ConfigKey::PipelineDissolve => "pipeline",
            ConfigKey::SessionDebounceMs
            | ConfigKey::SessionViewportWidth
            | ConfigKey::SessionViewportHeight => "session",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::FetchEndpoint => "endpoint",
            ConfigKey::FetchTimeout => "timeout",
            ConfigKey::FetchMinZoom => "min_zoom",
            ConfigKey::ZonesBufferRadius => "buffer_radius_m",
            ConfigKey::ZonesMarkerRadius => "marker_radius_m",
            ConfigKey::ZonesPrecision => "precision",
            ConfigKey::ZonesCircleSegments => "circle_segments",
            ConfigKey::PipelineBuffer => "buffer",
            ConfigKey::PipelineDissolve => "dissolve",
            ConfigKey::SessionDebounceMs => "debounce_ms",
            ConfigKey::SessionViewportWidth => "viewport_width",
            ConfigKey::SessionViewportHeight => "viewport_height",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when an optional value is unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::FetchEndpoint => config.fetch.endpoint.clone(),
            ConfigKey::FetchTimeout => config.fetch.timeout_secs.to_string(),
            ConfigKey::FetchMinZoom => config.fetch.min_zoom.to_string(),
            ConfigKey::ZonesBufferRadius => config.zones.buffer_radius_m.to_string(),
            ConfigKey::ZonesMarkerRadius => config.zones.marker_radius_m.to_string(),
            ConfigKey::ZonesPrecision => config.zones.precision.to_string(),
            ConfigKey::ZonesCircleSegments => config.zones.circle_segments.to_string(),
            ConfigKey::PipelineBuffer => config.pipeline.buffer.to_string(),
            ConfigKey::PipelineDissolve => config.pipeline.dissolve.to_string(),
            ConfigKey::SessionDebounceMs => config.session.debounce_ms.to_string(),
            ConfigKey::SessionViewportWidth => config.session.viewport_width.to_string(),
            ConfigKey::SessionViewportHeight => config.session.viewport_height.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let name = self.name();
        let key = name.as_str();
        match self {
            ConfigKey::FetchEndpoint => {
                let endpoint = value.trim();
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    return Err(invalid(key, value, "must be an http(s) URL"));
                }
                config.fetch.endpoint = endpoint.to_string();
            }
            ConfigKey::FetchTimeout => {
                let secs: u64 = parse_number(key, value)?;
                if secs == 0 {
                    return Err(invalid(key, value, "must be at least 1 second"));
                }
                config.fetch.timeout_secs = secs;
            }
            ConfigKey::FetchMinZoom => config.fetch.min_zoom = parse_zoom(key, value)?,
            ConfigKey::ZonesBufferRadius => {
                config.zones.buffer_radius_m = parse_positive_f64(key, value)?
            }
            ConfigKey::ZonesMarkerRadius => {
                config.zones.marker_radius_m = parse_positive_f64(key, value)?
            }
            ConfigKey::ZonesPrecision => {
                let precision: u32 = parse_number(key, value)?;
                if precision > 12 {
                    return Err(invalid(key, value, "must be at most 12"));
                }
                config.zones.precision = precision;
            }
            ConfigKey::ZonesCircleSegments => {
                let segments: usize = parse_number(key, value)?;
                if segments < 8 {
                    return Err(invalid(key, value, "must be at least 8"));
                }
                config.zones.circle_segments = segments;
            }
            ConfigKey::PipelineBuffer => config.pipeline.buffer = parse_bool(key, value)?,
            ConfigKey::PipelineDissolve => config.pipeline.dissolve = parse_bool(key, value)?,
            ConfigKey::SessionDebounceMs => config.session.debounce_ms = parse_number(key, value)?,
            ConfigKey::SessionViewportWidth | ConfigKey::SessionViewportHeight => {
                let px: u32 = parse_number(key, value)?;
                if px == 0 {
                    return Err(invalid(key, value, "must be positive"));
                }
                if *self == ConfigKey::SessionViewportWidth {
                    config.session.viewport_width = px;
                } else {
                    config.session.viewport_height = px;
                }
            }
            ConfigKey::LoggingLevel => config.logging.level = parse_level(key, value)?,
            ConfigKey::LoggingDirectory => {
                let trimmed = value.trim();
                config.logging.directory = if trimmed.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(trimmed))
                };
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!(
            "zones.buffer_radius_m".parse::<ConfigKey>().unwrap(),
            ConfigKey::ZonesBufferRadius
        );
        assert!(matches!(
            "zones.nope".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_get_set() {
        let mut config = ConfigFile::default();
        assert_eq!(ConfigKey::FetchMinZoom.get(&config), "12");
        assert_eq!(ConfigKey::LoggingDirectory.get(&config), "");

        ConfigKey::PipelineDissolve.set(&mut config, "no").unwrap();
        ConfigKey::SessionViewportHeight.set(&mut config, "600").unwrap();
        assert!(!config.pipeline.dissolve);
        assert_eq!(config.session.viewport_height, 600);
        assert_eq!(config.session.viewport_width, 1280);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::FetchEndpoint.set(&mut config, "ftp://x").is_err());
        assert!(ConfigKey::ZonesCircleSegments.set(&mut config, "4").is_err());
        assert!(ConfigKey::FetchTimeout.set(&mut config, "0").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_clear_log_directory() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingDirectory.set(&mut config, "/tmp/zonemap").unwrap();
        assert_eq!(config.logging.directory, Some(PathBuf::from("/tmp/zonemap")));
        ConfigKey::LoggingDirectory.set(&mut config, "").unwrap();
        assert_eq!(config.logging.directory, None);
    }
}
