//! Inbound command messages and their validation.
//!
//! Messages arrive as loosely typed JSON:
//!
//! ```json
//! {"source": "panel", "timestamp": "2024-01-01T12:00:00Z",
//!  "command": "select_beverage", "payload": {"beverage": "espresso"}}
//! ```
//!
//! Validation uses Stillwater's `Validation` so a message with several
//! problems reports all of them at once. A message that fails never
//! reaches the machine core.

mod violations;

pub use violations::{MalformedCommand, PayloadViolation};

use crate::core::Beverage;
use crate::machine::Command;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<PayloadViolation>>;

/// A command message as received from a client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundCommand {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub command: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl InboundCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            source: String::new(),
            timestamp: None,
            command: command.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Decode a raw JSON message.
    pub fn from_json(json: &str) -> Result<Self, MalformedCommand> {
        serde_json::from_str(json).map_err(|e| {
            MalformedCommand::new("", vec![PayloadViolation::Unparseable(e.to_string())])
        })
    }

    /// Run every check, accumulating all violations.
    pub fn validate(&self) -> Check {
        let checks = vec![
            known_command(&self.command),
            payload_shape(self.payload.as_ref()),
            arguments(&self.command, self.payload.as_ref()),
        ];
        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate and convert into a typed [`Command`].
    pub fn parse(&self) -> Result<Command, MalformedCommand> {
        match self.validate() {
            Validation::Success(_) => to_command(&self.command, self.payload.as_ref())
                .map_err(|v| MalformedCommand::new(&self.command, vec![v])),
            Validation::Failure(errors) => Err(MalformedCommand::new(
                &self.command,
                errors.iter().cloned().collect(),
            )),
        }
    }
}

fn known_command(name: &str) -> Check {
    if Command::NAMES.contains(&name) {
        Validation::success(())
    } else {
        Validation::fail(PayloadViolation::UnknownCommand {
            command: name.to_string(),
        })
    }
}

/// A payload, when present, must be an object.
fn payload_shape(payload: Option<&Value>) -> Check {
    match payload {
        None | Some(Value::Object(_)) | Some(Value::Null) => Validation::success(()),
        Some(_) => Validation::fail(PayloadViolation::PayloadNotObject),
    }
}

fn arguments(name: &str, payload: Option<&Value>) -> Check {
    if name != "select_beverage" {
        return Validation::success(());
    }
    match beverage_argument(payload) {
        Ok(_) => Validation::success(()),
        Err(violation) => Validation::fail(violation),
    }
}

fn beverage_argument(payload: Option<&Value>) -> Result<Beverage, PayloadViolation> {
    let value = payload
        .and_then(|p| p.get("beverage"))
        .ok_or(PayloadViolation::MissingField { field: "beverage" })?;
    let name = value.as_str().ok_or(PayloadViolation::WrongType {
        field: "beverage",
        expected: "string",
    })?;
    name.parse::<Beverage>()
        .map_err(|_| PayloadViolation::UnknownBeverage {
            beverage: name.to_string(),
        })
}

fn to_command(name: &str, payload: Option<&Value>) -> Result<Command, PayloadViolation> {
    let command = match name {
        "turn_on" => Command::TurnOn,
        "turn_off" => Command::TurnOff,
        "place_cup" => Command::PlaceCup,
        "remove_cup" => Command::RemoveCup,
        "select_beverage" => Command::SelectBeverage {
            beverage: beverage_argument(payload)?,
        },
        "confirm_selection" => Command::ConfirmSelection,
        "start_cleaning" => Command::StartCleaning,
        "reset_error" => Command::ResetError,
        "refill_water" => Command::RefillWater,
        "refill_coffee" => Command::RefillCoffee,
        other => {
            return Err(PayloadViolation::UnknownCommand {
                command: other.to_string(),
            })
        }
    };
    Ok(command)
}
