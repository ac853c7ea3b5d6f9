//! Typed commands accepted by the machine.

use crate::core::{Beverage, Refill};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// An external request to the dispenser.
///
/// Wire form is `{"command": "select_beverage", "payload": {"beverage": "espresso"}}`;
/// commands without arguments omit `payload`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "snake_case")]
pub enum Command {
    TurnOn,
    TurnOff,
    PlaceCup,
    RemoveCup,
    SelectBeverage { beverage: Beverage },
    ConfirmSelection,
    StartCleaning,
    ResetError,
    RefillWater,
    RefillCoffee,
}

impl Command {
    /// Every command name the machine understands.
    pub const NAMES: [&'static str; 10] = [
        "turn_on",
        "turn_off",
        "place_cup",
        "remove_cup",
        "select_beverage",
        "confirm_selection",
        "start_cleaning",
        "reset_error",
        "refill_water",
        "refill_coffee",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::PlaceCup => "place_cup",
            Self::RemoveCup => "remove_cup",
            Self::SelectBeverage { .. } => "select_beverage",
            Self::ConfirmSelection => "confirm_selection",
            Self::StartCleaning => "start_cleaning",
            Self::ResetError => "reset_error",
            Self::RefillWater => "refill_water",
            Self::RefillCoffee => "refill_coffee",
        }
    }

    /// The command's arguments as a JSON object (`{}` when it has none).
    pub fn payload(&self) -> Value {
        match self {
            Self::SelectBeverage { beverage } => json!({ "beverage": beverage.name() }),
            _ => json!({}),
        }
    }

    /// The resource a refill command tops up.
    pub fn refill(&self) -> Option<Refill> {
        match self {
            Self::RefillWater => Some(Refill::Water),
            Self::RefillCoffee => Some(Refill::Coffee),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
