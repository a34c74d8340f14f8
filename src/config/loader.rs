//! Configuration Loader
//!
//! Loads and validates run configuration from TOML files.
//!
//! ```toml
//! [simulation]
//! path_count = 500
//! horizon_steps = 90
//! seed = 42
//!
//! [estimation]
//! lookback = 252
//!
//! [logging]
//! level = "info"
//!
//! [output]
//! format = "text"
//! include_paths = false
//! ```
//!
//! Every section is optional; missing values fall back to the engine defaults.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::adapters::report::ReportFormat;
use crate::engine::params::{
    SimulationConfig, DEFAULT_CHUNK_SIZE, DEFAULT_HORIZON_STEPS, DEFAULT_PARALLEL_THRESHOLD,
    DEFAULT_PATH_COUNT,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub estimation: EstimationSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Simulation configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    /// Number of simulated paths
    #[serde(default = "default_path_count")]
    pub path_count: usize,
    /// Steps simulated after the last observed price
    #[serde(default = "default_horizon_steps")]
    pub horizon_steps: usize,
    /// Base seed for reproducible runs (omit for fresh randomness)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Path count at which generation goes parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Paths per chunk for cancellable runs
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            path_count: DEFAULT_PATH_COUNT,
            horizon_steps: DEFAULT_HORIZON_STEPS,
            seed: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn default_path_count() -> usize {
    DEFAULT_PATH_COUNT
}

fn default_horizon_steps() -> usize {
    DEFAULT_HORIZON_STEPS
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Estimation configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimationSection {
    /// Number of most recent prices used (omit for the whole series)
    #[serde(default)]
    pub lookback: Option<usize>,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Output configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub format: ReportFormat,
    /// Include every simulated path in JSON output
    #[serde(default)]
    pub include_paths: bool,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        SimulationConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got '{}'",
                LEVELS, self.logging.level
            )));
        }

        Ok(())
    }
}

impl From<&Config> for SimulationConfig {
    fn from(config: &Config) -> Self {
        SimulationConfig {
            path_count: config.simulation.path_count,
            horizon_steps: config.simulation.horizon_steps,
            seed: config.simulation.seed,
            parallel_threshold: config.simulation.parallel_threshold,
            chunk_size: config.simulation.chunk_size,
            lookback: config.estimation.lookback,
        }
    }
}
