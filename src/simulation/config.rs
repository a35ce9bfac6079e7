//! Simulator configuration.
//!
//! Values come from defaults, then an optional TOML file, then CLI flags.

use crate::replica::REPLICA_FILE_NAME;
use crate::source::{DEFAULT_CHUNK_WIDTH, MAX_POOL_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest accepted chunk width in bytes.
pub const MAX_CHUNK_WIDTH: usize = 4096;

/// Tunables for the generation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Batch-size threshold in bytes; each batch strictly exceeds it.
    pub min_pool_size: usize,
    /// Bytes drawn per reseed.
    pub chunk_width: usize,
    /// Pause between cycles in milliseconds.
    pub cycle_delay_ms: u64,
    /// Replica file name inside the target directory.
    pub file_name: String,
    /// Stop after this many cycles (unlimited if unset).
    pub max_cycles: Option<u64>,
    /// Print the base64 progress line for each cycle.
    pub print_progress: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 512,
            chunk_width: DEFAULT_CHUNK_WIDTH,
            cycle_delay_ms: 10,
            file_name: REPLICA_FILE_NAME.to_string(),
            max_cycles: None,
            print_progress: true,
        }
    }
}

impl SimulatorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_pool_size == 0 || self.min_pool_size > MAX_POOL_SIZE {
            return Err(ConfigError::InvalidPoolSize(self.min_pool_size));
        }
        if self.chunk_width == 0 || self.chunk_width > MAX_CHUNK_WIDTH {
            return Err(ConfigError::InvalidChunkWidth(self.chunk_width));
        }
        if self.file_name.is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidFileName(self.file_name.clone()));
        }
        Ok(())
    }

    /// Inter-cycle pause.
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid minimum pool size {0} (must be 1-{max})", max = MAX_POOL_SIZE)]
    InvalidPoolSize(usize),
    #[error("invalid chunk width {0} (must be 1-4096)")]
    InvalidChunkWidth(usize),
    #[error("invalid replica file name {0:?}")]
    InvalidFileName(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metrics exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.simulator.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = SimulatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cycle_delay(), Duration::from_millis(10));
        assert_eq!(config.file_name, "dev_random_replica");
    }

    #[test]
    fn test_zero_pool_size_invalid() {
        let config = SimulatorConfig {
            min_pool_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPoolSize(0))
        ));
    }

    #[test]
    fn test_oversized_pool_size_invalid() {
        for size in [MAX_POOL_SIZE + 1, usize::MAX] {
            let config = SimulatorConfig {
                min_pool_size: size,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidPoolSize(s)) if s == size
            ));
        }

        let max = SimulatorConfig {
            min_pool_size: MAX_POOL_SIZE,
            ..Default::default()
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_oversized_pool_size_in_toml_rejected() {
        let text = format!("[simulator]\nmin_pool_size = {}\n", MAX_POOL_SIZE + 1);
        assert!(matches!(
            FileConfig::from_toml(&text),
            Err(ConfigError::InvalidPoolSize(_))
        ));
    }

    #[test]
    fn test_chunk_width_bounds() {
        for width in [0, MAX_CHUNK_WIDTH + 1] {
            let config = SimulatorConfig {
                chunk_width: width,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidChunkWidth(_))
            ));
        }
    }

    #[test]
    fn test_file_name_with_separator_invalid() {
        let config = SimulatorConfig {
            file_name: "../escape".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [simulator]
            min_pool_size = 1024
            cycle_delay_ms = 0

            [metrics]
            port = 9100
            "#,
        )
        .unwrap();
        assert_eq!(config.simulator.min_pool_size, 1024);
        assert_eq!(config.simulator.cycle_delay_ms, 0);
        assert_eq!(config.simulator.chunk_width, 8);
        assert_eq!(config.metrics.port, 9100);
    }

    #[test]
    fn test_invalid_toml_values_rejected() {
        let result = FileConfig::from_toml("[simulator]\nchunk_width = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidChunkWidth(0))));
    }
}
