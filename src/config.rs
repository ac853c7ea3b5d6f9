//! Simulation parameters for one machine.

use crate::core::{Thresholds, MAX_LEVEL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors raised while loading or validating a [`MachineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunable parameters of the simulated machine.
///
/// Every field has a default, so a partial JSON document such as
/// `{"seed": 7}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Shortest self-check, in milliseconds.
    pub self_check_min_ms: u64,
    /// Longest self-check, in milliseconds.
    pub self_check_max_ms: u64,
    /// How long a placed cup waits for a confirmed selection.
    pub selection_timeout_ms: u64,
    /// Length of a cleaning cycle.
    pub cleaning_ms: u64,
    /// Water level below which the tank counts as empty.
    pub water_threshold: u8,
    /// Coffee level below which the hopper counts as empty.
    pub coffee_threshold: u8,
    /// Degrees gained per heating step during self-check.
    pub heater_step: u8,
    /// Completed brews that trigger an automatic cleaning cycle.
    pub auto_clean_after: u32,
    /// State changes between persisted snapshots.
    pub snapshot_interval: u32,
    /// Delay before a timed process whose completion failed to persist is retried.
    pub retry_backoff_ms: u64,
    /// Seed for the duration generator; random when absent.
    pub seed: Option<u64>,
    /// Bound of the actor's inbound queue.
    pub channel_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            self_check_min_ms: 3_000,
            self_check_max_ms: 7_000,
            selection_timeout_ms: 30_000,
            cleaning_ms: 8_000,
            water_threshold: 10,
            coffee_threshold: 5,
            heater_step: 10,
            auto_clean_after: 10,
            snapshot_interval: 1,
            retry_backoff_ms: 1_000,
            seed: None,
            channel_capacity: 64,
        }
    }
}

impl MachineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.self_check_min_ms > self.self_check_max_ms {
            return Err(ConfigError::Invalid(format!(
                "self_check_min_ms ({}) exceeds self_check_max_ms ({})",
                self.self_check_min_ms, self.self_check_max_ms
            )));
        }
        if self.water_threshold > MAX_LEVEL || self.coffee_threshold > MAX_LEVEL {
            return Err(ConfigError::Invalid(
                "thresholds must be percentages".to_string(),
            ));
        }
        if self.auto_clean_after == 0 {
            return Err(ConfigError::Invalid(
                "auto_clean_after must be at least 1".to_string(),
            ));
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::Invalid(
                "snapshot_interval must be at least 1".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            water: self.water_threshold,
            coffee: self.coffee_threshold,
        }
    }

    pub fn self_check_range(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.self_check_min_ms),
            Duration::from_millis(self.self_check_max_ms),
        )
    }

    pub fn selection_timeout(&self) -> Duration {
        Duration::from_millis(self.selection_timeout_ms)
    }

    pub fn cleaning_duration(&self) -> Duration {
        Duration::from_millis(self.cleaning_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
