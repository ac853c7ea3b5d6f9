//! Brewstate: an event-sourced state machine for beverage dispensers
//!
//! Brewstate keeps a pure core and an imperative shell. The data model,
//! guards and the event reducer are pure functions with no side effects;
//! persistence, timers and notifications live in an actor that owns the
//! machine.
//!
//! # Core Concepts
//!
//! - **State**: the closed set of dispenser states via the `State` trait
//! - **Events**: every change is an event in an append-only log, folded
//!   into the machine by a pure reducer
//! - **Guards**: pure predicates that qualify which commands are legal
//! - **Processes**: timed work (self-check, brewing, cleaning, selection
//!   timeout) armed on entry to a state, at most one at a time
//! - **Snapshots**: derived checkpoints that shorten recovery
//!
//! # Example
//!
//! ```rust
//! use brewstate::core::{MachineState, Process};
//! use brewstate::machine::{Command, FixedDurations, Machine};
//! use brewstate::storage::MemoryStore;
//! use brewstate::MachineConfig;
//! use std::time::Duration;
//!
//! let mut machine = Machine::open(
//!     MachineConfig::default(),
//!     Box::new(MemoryStore::new()),
//!     Box::new(FixedDurations(Duration::from_secs(1))),
//! )
//! .unwrap();
//!
//! machine.start().unwrap();
//! machine.apply(Command::TurnOn).unwrap();
//! assert_eq!(machine.state(), MachineState::SelfCheck);
//!
//! machine.complete(Process::SelfCheck).unwrap();
//! assert_eq!(machine.state(), MachineState::Ready);
//! assert_eq!(machine.log().replay(None), *machine.instance());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod machine;
pub mod notify;
pub mod runtime;
pub mod scheduler;
pub mod storage;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use checkpoint::Snapshot;
pub use config::MachineConfig;
pub use crate::core::{Beverage, ErrorKind, MachineInstance, MachineState, Process, State};
pub use dispatch::InboundCommand;
pub use error::{CommandError, DispatchError};
pub use events::{Event, EventKind, EventLog};
pub use machine::{Command, EventBatch, Machine};
pub use runtime::MachineHandle;
