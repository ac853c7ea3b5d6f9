//! How long each timed process takes.

use crate::config::MachineConfig;
use crate::core::{Beverage, Process};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Source of process durations.
///
/// The machine asks for a duration each time it arms a process. Brewing
/// is always asked with the beverage being made.
pub trait DurationSource: Send {
    fn duration_for(&mut self, process: Process, beverage: Option<Beverage>) -> Duration;
}

/// Durations of the simulated hardware.
///
/// Self-check takes a uniformly random time within the configured range,
/// drawn from a seeded generator so runs can be reproduced.
#[derive(Debug, Clone)]
pub struct SimulatedDurations {
    self_check_ms: (u64, u64),
    selection_timeout: Duration,
    cleaning: Duration,
    rng: ChaCha8Rng,
}

impl SimulatedDurations {
    pub fn from_config(config: &MachineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            self_check_ms: (config.self_check_min_ms, config.self_check_max_ms),
            selection_timeout: config.selection_timeout(),
            cleaning: config.cleaning_duration(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedDurations {
    fn default() -> Self {
        Self::from_config(&MachineConfig::default())
    }
}

impl DurationSource for SimulatedDurations {
    fn duration_for(&mut self, process: Process, beverage: Option<Beverage>) -> Duration {
        match process {
            Process::SelfCheck => {
                let (min, max) = self.self_check_ms;
                Duration::from_millis(self.rng.gen_range(min..=max.max(min)))
            }
            Process::SelectionTimeout => self.selection_timeout,
            Process::Brew => beverage.map_or(Duration::ZERO, |b| b.spec().brew_time),
            Process::Cleaning => self.cleaning,
        }
    }
}

/// Every process takes the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDurations(pub Duration);

impl DurationSource for FixedDurations {
    fn duration_for(&mut self, _process: Process, _beverage: Option<Beverage>) -> Duration {
        self.0
    }
}
