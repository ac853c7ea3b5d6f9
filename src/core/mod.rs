//! Core dispenser types and logic.
//!
//! This module contains the pure data model of the machine:
//! - State definitions via the `State` trait
//! - The resource ledger and beverage catalog
//! - Guard predicates for transition control
//! - The `MachineInstance` aggregate root
//!
//! Nothing in here performs I/O, spawns tasks or reads the clock.

mod beverage;
mod guard;
mod instance;
mod resources;
mod state;

pub use beverage::{Beverage, BeverageSpec, UnknownBeverage};
pub use guard::Guard;
pub use instance::{MachineInstance, Process};
pub use resources::{
    Refill, Resources, Thresholds, AMBIENT_TEMPERATURE, MAX_LEVEL, OPERATING_TEMPERATURE,
};
pub use state::{ErrorKind, MachineState, State};
