//! Engine configuration loading
//!
//! The engine runs on built-in defaults; a TOML file may override them.
//!
//! # Configuration Philosophy
//!
//! - **Defaults in code**: `EngineConfig::default()` carries the buffering
//!   and position constants the engine was designed around
//! - **Partial files**: every section and key is optional
//! - **Graceful degradation**: a missing file logs a warning and yields
//!   defaults; a malformed or invalid file is an error
//!
//! ```toml
//! [buffering]
//! network_cache_factor = 30
//! standard_cache_factor = 4
//!
//! [position]
//! generic_frame_step_ms = 10
//!
//! [logging]
//! level = "debug"
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Cache threshold estimation
    pub buffering: BufferingConfig,

    /// Position discretization
    pub position: PositionConfig,

    /// Volatile controller property limits
    pub controller: ControllerConfig,

    /// Event bus sizing
    pub events: EventsConfig,

    /// Logging configuration (used by drivers, not by the engine itself)
    pub logging: LoggingConfig,
}

/// Buffering estimator tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BufferingConfig {
    /// Bitrates at or below this value (bits/s) are treated as implausible
    pub minimum_valid_bitrate: u64,

    /// Buffer cache length (bytes) used when no plausible bitrate is known
    pub starting_cache_length: u64,

    /// Download cache multiplier for network and live streams
    pub network_cache_factor: u64,

    /// Download cache multiplier for local streams
    pub standard_cache_factor: u64,

    /// Multiplier applied to container-reported bitrates
    pub bitrate_safety_factor: f64,

    /// Multiplier applied to the observed byte rate when guessing
    pub guess_safety_factor: f64,

    /// Decoded duration every component needs before a byte rate is guessed
    pub minimum_guess_duration_ms: i64,
}

impl Default for BufferingConfig {
    fn default() -> Self {
        Self {
            minimum_valid_bitrate: 96 * 1000,
            starting_cache_length: 512 * 1024,
            network_cache_factor: 30,
            standard_cache_factor: 4,
            bitrate_safety_factor: 2.0,
            guess_safety_factor: 1.2,
            minimum_guess_duration_ms: 1000,
        }
    }
}

/// Position tracker tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Frame step used when the media has no video frame rate
    pub generic_frame_step_ms: i64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            generic_frame_step_ms: 10,
        }
    }
}

/// Volatile controller property limits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub min_speed_ratio: f64,
    pub max_speed_ratio: f64,
    /// Volume of a freshly created engine (0.0-1.0)
    pub default_volume: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_speed_ratio: 0.0,
            max_speed_ratio: 8.0,
            default_volume: 1.0,
        }
    }
}

/// Event bus sizing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Number of events buffered per subscriber before lagging
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// Fails if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// - `None` → defaults
    /// - path does not exist → warning + defaults
    /// - path exists but is malformed/invalid → error
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) if !path.exists() => {
                warn!(
                    "Config file {} not found, using built-in defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Some(path) => Self::load(path),
        }
    }

    /// Check invariants the engine relies on
    ///
    /// Cache factors below 1 would let the download cache fall under the
    /// buffer cache.
    pub fn validate(&self) -> Result<()> {
        let b = &self.buffering;
        if b.network_cache_factor < 1 || b.standard_cache_factor < 1 {
            return Err(Error::Config(format!(
                "cache factors must be >= 1 (network={}, standard={})",
                b.network_cache_factor, b.standard_cache_factor
            )));
        }
        if !(b.bitrate_safety_factor.is_finite() && b.bitrate_safety_factor > 0.0) {
            return Err(Error::Config(format!(
                "bitrate_safety_factor must be positive, got {}",
                b.bitrate_safety_factor
            )));
        }
        if !(b.guess_safety_factor.is_finite() && b.guess_safety_factor > 0.0) {
            return Err(Error::Config(format!(
                "guess_safety_factor must be positive, got {}",
                b.guess_safety_factor
            )));
        }
        if b.minimum_guess_duration_ms <= 0 {
            return Err(Error::Config(format!(
                "minimum_guess_duration_ms must be positive, got {}",
                b.minimum_guess_duration_ms
            )));
        }
        if self.position.generic_frame_step_ms <= 0 {
            return Err(Error::Config(format!(
                "generic_frame_step_ms must be positive, got {}",
                self.position.generic_frame_step_ms
            )));
        }

        let c = &self.controller;
        if !(c.min_speed_ratio >= 0.0 && c.min_speed_ratio <= c.max_speed_ratio) {
            return Err(Error::Config(format!(
                "invalid speed ratio range {}..{}",
                c.min_speed_ratio, c.max_speed_ratio
            )));
        }
        if !(0.0..=1.0).contains(&c.default_volume) {
            return Err(Error::Config(format!(
                "default_volume must be within 0.0-1.0, got {}",
                c.default_volume
            )));
        }
        if self.events.capacity == 0 {
            return Err(Error::Config("event capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.buffering.minimum_valid_bitrate, 96_000);
        assert_eq!(config.buffering.starting_cache_length, 524_288);
        assert_eq!(config.buffering.network_cache_factor, 30);
        assert_eq!(config.buffering.standard_cache_factor, 4);
        assert_eq!(config.position.generic_frame_step_ms, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config = EngineConfig::from_toml_str(
            r#"
            [buffering]
            network_cache_factor = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.buffering.network_cache_factor, 10);
        // Untouched keys keep their defaults
        assert_eq!(config.buffering.standard_cache_factor, 4);
        assert_eq!(config.position, PositionConfig::default());
    }

    #[test]
    fn test_zero_cache_factor_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [buffering]
            standard_cache_factor = 0
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_inverted_speed_range_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [controller]
            min_speed_ratio = 4.0
            max_speed_ratio = 2.0
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = EngineConfig::from_toml_str("[buffering");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_wrong_type() {
        let result = EngineConfig::from_toml_str(
            r#"
            [position]
            generic_frame_step_ms = "ten"
            "#,
        );
        assert!(matches!(result, Err(Error::Toml(_))));
    }
}
