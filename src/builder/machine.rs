//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::machine::{DurationSource, Machine, SimulatedDurations};
use crate::notify::{NotificationSink, TracingSink};
use crate::runtime::{spawn_machine, MachineHandle};
use crate::storage::{EventStore, MemoryStore};
use std::sync::Arc;

/// Builder for constructing a [`Machine`] with a fluent API.
///
/// # Example
///
/// ```rust
/// use brewstate::builder::MachineBuilder;
/// use brewstate::config::MachineConfig;
/// use brewstate::core::MachineState;
///
/// let machine = MachineBuilder::new()
///     .config(MachineConfig { seed: Some(1), ..MachineConfig::default() })
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.state(), MachineState::Off);
/// ```
#[derive(Default)]
pub struct MachineBuilder {
    config: Option<MachineConfig>,
    store: Option<Box<dyn EventStore>>,
    durations: Option<Box<dyn DurationSource>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Where events and snapshots are persisted. Defaults to memory.
    pub fn store(mut self, store: impl EventStore) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Override process durations. Defaults to [`SimulatedDurations`].
    pub fn durations(mut self, durations: impl DurationSource + 'static) -> Self {
        self.durations = Some(Box::new(durations));
        self
    }

    /// Where notifications go. Defaults to [`TracingSink`].
    pub fn sink(mut self, sink: impl NotificationSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Validate the config and recover the machine from its store.
    pub fn build(self) -> Result<Machine, BuildError> {
        self.into_parts().map(|(machine, _)| machine)
    }

    /// Build the machine and start it on an actor task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> Result<MachineHandle, BuildError> {
        let (machine, sink) = self.into_parts()?;
        Ok(spawn_machine(machine, sink)?)
    }

    fn into_parts(self) -> Result<(Machine, Arc<dyn NotificationSink>), BuildError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let durations = self
            .durations
            .unwrap_or_else(|| Box::new(SimulatedDurations::from_config(&config)));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let machine = Machine::open(config, store, durations)?;
        Ok((machine, sink))
    }
}
