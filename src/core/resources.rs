//! Resource ledger: consumable levels and their mutation rules.
//!
//! Every mutation is a total function over the bounded domain: levels
//! stay within `[0, 100]` percent and temperature within `[20, 90]` °C.
//! The ledger never decides what a crossed threshold means; that is the
//! caller's job (see [`Resources::depletion`]).

use super::state::ErrorKind;
use serde::{Deserialize, Serialize};

/// Upper bound for water and coffee levels, in percent.
pub const MAX_LEVEL: u8 = 100;

/// Temperature the boiler cools down to when idle, in °C.
pub const AMBIENT_TEMPERATURE: u8 = 20;

/// Temperature the boiler must reach before brewing, in °C.
pub const OPERATING_TEMPERATURE: u8 = 90;

/// Consumable levels tracked for one machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Water tank level in percent.
    pub water_level: u8,
    /// Coffee hopper level in percent.
    pub coffee_level: u8,
    /// Boiler temperature in °C.
    pub temperature: u8,
    /// Whether a cup sits under the spout.
    pub cup_present: bool,
    /// Beverages brewed since the last cleaning cycle.
    pub cleaning_cycles: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            water_level: MAX_LEVEL,
            coffee_level: MAX_LEVEL,
            temperature: AMBIENT_TEMPERATURE,
            cup_present: false,
            cleaning_cycles: 0,
        }
    }
}

/// A consumable that can be refilled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Refill {
    Water,
    Coffee,
}

/// Levels below which a consumable counts as exhausted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub water: u8,
    pub coffee: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            water: 10,
            coffee: 5,
        }
    }
}

impl Resources {
    /// Subtract a beverage's cost, saturating at zero.
    ///
    /// Consumption is applied unconditionally; a level may end up under
    /// its threshold and it is up to the caller to react.
    pub fn consume(self, water: u8, coffee: u8) -> Self {
        Self {
            water_level: self.water_level.saturating_sub(water),
            coffee_level: self.coffee_level.saturating_sub(coffee),
            ..self
        }
    }

    /// Reset one consumable to a full tank.
    pub fn refill(self, kind: Refill) -> Self {
        match kind {
            Refill::Water => Self {
                water_level: MAX_LEVEL,
                ..self
            },
            Refill::Coffee => Self {
                coffee_level: MAX_LEVEL,
                ..self
            },
        }
    }

    /// Change the temperature by `delta` degrees, clamped to the boiler range.
    pub fn heat(self, delta: i16) -> Self {
        let target = i16::from(self.temperature).saturating_add(delta);
        Self {
            temperature: clamp_temperature(target),
            ..self
        }
    }

    /// Set the temperature outright, clamped to the boiler range.
    pub fn with_temperature(self, temperature: u8) -> Self {
        Self {
            temperature: clamp_temperature(i16::from(temperature)),
            ..self
        }
    }

    /// Report which consumable is below its threshold, water first.
    pub fn depletion(&self, thresholds: &Thresholds) -> Option<ErrorKind> {
        if self.water_level < thresholds.water {
            Some(ErrorKind::WaterEmpty)
        } else if self.coffee_level < thresholds.coffee {
            Some(ErrorKind::CoffeeEmpty)
        } else {
            None
        }
    }

    /// Whether every bounded field is inside its domain.
    pub fn in_bounds(&self) -> bool {
        self.water_level <= MAX_LEVEL
            && self.coffee_level <= MAX_LEVEL
            && (AMBIENT_TEMPERATURE..=OPERATING_TEMPERATURE).contains(&self.temperature)
    }
}

fn clamp_temperature(value: i16) -> u8 {
    let clamped = value.clamp(
        i16::from(AMBIENT_TEMPERATURE),
        i16::from(OPERATING_TEMPERATURE),
    );
    // Within [20, 90] after the clamp.
    clamped as u8
}
