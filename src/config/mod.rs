//! Configuration module - environment variable parsing

pub mod tuning;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub use tuning::ControllerTuning;

use crate::util::time::DEFAULT_TPS;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Ticks before the session ends on its own
    pub max_ticks: u64,
    /// Ticks between frame snapshots
    pub snapshot_interval: u32,
    /// Seed for drop rotations and the demo bot; random when unset
    pub seed: Option<u64>,

    /// Optional gameplay tuning document
    pub tuning_path: Option<PathBuf>,
    /// Where volume settings persist; in-memory only when unset
    pub volume_settings_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_rate: DEFAULT_TPS,
            max_ticks: 1_800,
            snapshot_interval: 30,
            seed: None,
            tuning_path: None,
            volume_settings_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let tick_rate = parse_var("TICK_RATE")?.unwrap_or(defaults.tick_rate);
        if tick_rate == 0 {
            return Err(ConfigError::Invalid {
                name: "TICK_RATE",
                value: "0".to_string(),
            });
        }

        let snapshot_interval =
            parse_var("SNAPSHOT_INTERVAL")?.unwrap_or(defaults.snapshot_interval);

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            tick_rate,
            max_ticks: parse_var("MAX_TICKS")?.unwrap_or(defaults.max_ticks),
            snapshot_interval: snapshot_interval.max(1),
            seed: parse_var("SESSION_SEED")?,
            tuning_path: env::var("TUNING_PATH").ok().map(PathBuf::from),
            volume_settings_path: env::var("VOLUME_SETTINGS_PATH").ok().map(PathBuf::from),
        })
    }

    /// Gameplay tuning from `tuning_path`, or the defaults
    pub fn load_tuning(&self) -> Result<ControllerTuning, ConfigError> {
        match &self.tuning_path {
            Some(path) => ControllerTuning::from_file(path),
            None => Ok(ControllerTuning::default()),
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Failed to read tuning file {}: {source}", .path.display())]
    TuningRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed tuning document: {0}")]
    TuningFormat(#[source] serde_json::Error),
}
