//! Configuration for the sensor logger.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sds011_protocol::SensorAddress;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Serial device selection and setup.
    #[serde(default)]
    pub serial: SerialConfig,

    /// Every sensor that may be attached to any of the links, by address.
    /// Which link a sensor actually sits on is learned at startup.
    pub sensors: Vec<SensorAddress>,

    /// Seconds between measurement passes.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-exchange timeout in milliseconds. Values under 400 are accepted
    /// but miss replies in practice; they are never clamped.
    #[serde(default = "default_exchange_timeout")]
    pub exchange_timeout_ms: u64,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_poll_interval() -> u64 {
    60
}

fn default_exchange_timeout() -> u64 {
    400
}

/// Serial device selection and setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Substring a device path must contain to be treated as a sensor link
    /// (e.g., "wchusbserial" for the common CH340 USB adapters).
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Baud rate; the SDS011 is fixed at 9600.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_pattern() -> String {
    "wchusbserial".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            baud_rate: default_baud_rate(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the date-stamped CSV file is written to.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl OutputConfig {
    /// Path of today's CSV file: `<directory>/data_<YYYY-MM-DD>.csv`.
    pub fn csv_path(&self) -> PathBuf {
        let today = chrono::Local::now().format("%Y-%m-%d");
        self.directory.join(format!("data_{today}.csv"))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: LoggerConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::Validation(
                "At least one sensor address must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for addr in &self.sensors {
            if !seen.insert(*addr) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate sensor address '{addr}'"
                )));
            }
        }

        if self.serial.pattern.is_empty() {
            return Err(ConfigError::Validation(
                "Serial device pattern cannot be empty".to_string(),
            ));
        }

        if self.exchange_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "exchange_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Interval between measurement passes.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Bound on one request/response exchange.
    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_millis(self.exchange_timeout_ms)
    }
}
