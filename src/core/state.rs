//! Machine states and error kinds.
//!
//! The `State` trait provides pure methods for inspecting a state
//! without side effects. `MachineState` is the closed set of states a
//! dispenser can be in; `ErrorKind` qualifies the `Error` state.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Trait for state machine states.
///
/// All methods are pure - no side effects. States are small immutable
/// values describing where the machine currently is.
///
/// # Example
///
/// ```rust
/// use brewstate::core::{MachineState, State};
///
/// assert_eq!(MachineState::SelfCheck.name(), "self_check");
/// assert!(MachineState::Error.is_error());
/// assert!(MachineState::ProduceBeverage.runs_process());
/// ```
pub trait State: Copy + Eq + Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Get the state's wire name for display/logging.
    fn name(&self) -> &'static str;

    /// Check if this is an error state.
    ///
    /// Default implementation returns `false`.
    fn is_error(&self) -> bool {
        false
    }

    /// Check if entering this state starts a timed process.
    ///
    /// Default implementation returns `false`.
    fn runs_process(&self) -> bool {
        false
    }
}

/// The closed set of dispenser states.
///
/// Exactly one is active per machine instance at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineState {
    Off,
    SelfCheck,
    Ready,
    AskBeverage,
    ProduceBeverage,
    SelfClean,
    Error,
}

impl MachineState {
    /// Every state, in declaration order.
    pub const ALL: [MachineState; 7] = [
        Self::Off,
        Self::SelfCheck,
        Self::Ready,
        Self::AskBeverage,
        Self::ProduceBeverage,
        Self::SelfClean,
        Self::Error,
    ];
}

impl State for MachineState {
    fn name(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::SelfCheck => "self_check",
            Self::Ready => "ready",
            Self::AskBeverage => "ask_beverage",
            Self::ProduceBeverage => "produce_beverage",
            Self::SelfClean => "self_clean",
            Self::Error => "error",
        }
    }

    fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    fn runs_process(&self) -> bool {
        matches!(
            self,
            Self::SelfCheck | Self::AskBeverage | Self::ProduceBeverage | Self::SelfClean
        )
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why the machine is in the `Error` state.
///
/// Present only while the state is `Error`; cleared on recovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    WaterEmpty,
    CoffeeEmpty,
    CupMissing,
    SystemError,
    CleaningError,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaterEmpty => "water_empty",
            Self::CoffeeEmpty => "coffee_empty",
            Self::CupMissing => "cup_missing",
            Self::SystemError => "system_error",
            Self::CleaningError => "cleaning_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
