//! Builder API for assembling a machine.
//!
//! Every part has a sensible default: an in-memory store, simulated
//! durations seeded from the config, and a sink that logs notifications.

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::MachineBuilder;
