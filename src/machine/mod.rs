//! The dispenser state machine.
//!
//! This module is the decision layer between the pure data model in
//! [`crate::core`] and the async runtime:
//!
//! - **Commands**: the typed requests the machine accepts
//! - **Transitions**: which command is legal in which state, and under what guard
//! - **Durations**: how long each timed process runs
//! - **Machine**: decides, persists and applies event batches
//!
//! `Machine` never sleeps or spawns. Each operation returns an
//! [`EventBatch`] whose [`TimerDirective`] tells the runtime what to do
//! with the process timer.

mod command;
mod durations;
mod engine;
mod transition;

pub use command::Command;
pub use durations::{DurationSource, FixedDurations, SimulatedDurations};
pub use engine::{EventBatch, Machine, TimerDirective};
pub use transition::{TransitionRule, TransitionTable};
