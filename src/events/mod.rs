//! Domain events and the append-only event log.
//!
//! Every change to a [`MachineInstance`](crate::core::MachineInstance) is
//! expressed as an [`Event`]. The live machine applies events through the
//! same pure [`reducer`] that replay uses, so reconstructing state from the
//! log is exact by construction.

mod log;
pub mod reducer;

pub use log::{EventLog, LogError};

use crate::core::{Beverage, ErrorKind, MachineState, Process, Refill};
use crate::machine::Command;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened, with the facts needed to replay it.
///
/// Adjacently tagged so the persisted form reads
/// `{"type": "resource_consumed", "data": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventKind {
    SystemStarted,
    StateChanged {
        from: MachineState,
        to: MachineState,
        reason: String,
    },
    /// An external command was accepted.
    CommandReceived {
        command: Command,
    },
    CupPlaced,
    CupRemoved,
    BeverageSelected {
        beverage: Beverage,
    },
    SelectionCleared,
    ResourceConsumed {
        beverage: Beverage,
        water: u8,
        coffee: u8,
    },
    BrewCompleted {
        beverage: Beverage,
    },
    ResourceRefilled {
        resource: Refill,
    },
    TemperatureChanged {
        temperature: u8,
    },
    ErrorOccurred {
        kind: ErrorKind,
    },
    ErrorCleared {
        kind: ErrorKind,
    },
    CleaningTriggered {
        automatic: bool,
    },
    CleaningCompleted,
    ProcessScheduled {
        process: Process,
        after_ms: u64,
    },
    ProcessCancelled {
        process: Process,
    },
}

impl EventKind {
    /// The outbound event name, e.g. `state_changed` or `command_turn_on`.
    pub fn event_type(&self) -> String {
        let name = match self {
            Self::SystemStarted => "system_started",
            Self::StateChanged { .. } => "state_changed",
            Self::CommandReceived { command } => return format!("command_{}", command.name()),
            Self::CupPlaced => "cup_placed",
            Self::CupRemoved => "cup_removed",
            Self::BeverageSelected { .. } => "beverage_selected",
            Self::SelectionCleared => "selection_cleared",
            Self::ResourceConsumed { .. } => "resource_consumed",
            Self::BrewCompleted { .. } => "brew_completed",
            Self::ResourceRefilled { .. } => "resource_refilled",
            Self::TemperatureChanged { .. } => "temperature_changed",
            Self::ErrorOccurred { .. } => "error_occurred",
            Self::ErrorCleared { .. } => "error_cleared",
            Self::CleaningTriggered { .. } => "cleaning_triggered",
            Self::CleaningCompleted => "cleaning_completed",
            Self::ProcessScheduled { .. } => "process_scheduled",
            Self::ProcessCancelled { .. } => "process_cancelled",
        };
        name.to_string()
    }

    /// Free-form payload for outbound notifications.
    ///
    /// Commands report their own payload (`{"beverage": "espresso"}`),
    /// everything else its variant fields. Fieldless kinds yield `{}`.
    pub fn data(&self) -> Value {
        if let Self::CommandReceived { command } = self {
            return command.payload();
        }
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut("data").map(Value::take))
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }
}

/// One immutable record in the event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic, gap-free sequence number starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    /// State of the machine when the event was produced.
    pub previous_state: MachineState,
    /// Set only for `state_changed` events.
    pub new_state: Option<MachineState>,
    pub kind: EventKind,
}

impl Event {
    pub fn event_type(&self) -> String {
        self.kind.event_type()
    }

    /// State of the machine right after this event.
    pub fn resulting_state(&self) -> MachineState {
        self.new_state.unwrap_or(self.previous_state)
    }
}
