//! The machine aggregate root and its timed processes.

use super::beverage::Beverage;
use super::resources::Resources;
use super::state::{ErrorKind, MachineState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A timed process armed on entry to a state.
///
/// At most one process is pending per machine, and which one is fully
/// determined by the state that armed it (see [`Process::on_entry`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    SelfCheck,
    SelectionTimeout,
    Brew,
    Cleaning,
}

impl Process {
    /// Entry-action table: the process a state arms when it is entered.
    pub fn on_entry(state: MachineState) -> Option<Process> {
        match state {
            MachineState::SelfCheck => Some(Self::SelfCheck),
            MachineState::AskBeverage => Some(Self::SelectionTimeout),
            MachineState::ProduceBeverage => Some(Self::Brew),
            MachineState::SelfClean => Some(Self::Cleaning),
            MachineState::Off | MachineState::Ready | MachineState::Error => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SelfCheck => "self_check",
            Self::SelectionTimeout => "selection_timeout",
            Self::Brew => "brew",
            Self::Cleaning => "cleaning",
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything known about one dispenser.
///
/// Mutated only by folding events (see [`crate::events::reducer`]), so
/// the live instance and a replayed one are always the same value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInstance {
    pub state: MachineState,
    pub previous_state: Option<MachineState>,
    /// Set only while `state` is `Error`.
    pub error_kind: Option<ErrorKind>,
    pub resources: Resources,
    pub selected_beverage: Option<Beverage>,
    /// The process armed by the current state, if it has not completed yet.
    pub pending: Option<Process>,
}

impl Default for MachineInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineInstance {
    /// A freshly installed machine: switched off, tanks full.
    pub fn new() -> Self {
        Self {
            state: MachineState::Off,
            previous_state: None,
            error_kind: None,
            resources: Resources::default(),
            selected_beverage: None,
            pending: None,
        }
    }

    pub fn cup_present(&self) -> bool {
        self.resources.cup_present
    }
}
