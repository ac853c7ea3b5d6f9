//! The dispenser's decision core.
//!
//! `Machine` owns the instance, the event log and the store. Every
//! operation follows the same shape:
//!
//! 1. decide which events describe the outcome (pure, reads the instance)
//! 2. stage them and fold them into a candidate instance
//! 3. commit the events (and a snapshot when due) to the store
//! 4. only then append to the log and swap in the candidate
//!
//! A failed commit returns before step 4, so the machine is unchanged.

use super::command::Command;
use super::durations::{DurationSource, SimulatedDurations};
use super::transition::TransitionTable;
use crate::checkpoint::Snapshot;
use crate::config::MachineConfig;
use crate::core::{
    Beverage, ErrorKind, MachineInstance, MachineState, Process, Thresholds, AMBIENT_TEMPERATURE,
    OPERATING_TEMPERATURE,
};
use crate::error::CommandError;
use crate::events::{reducer, Event, EventKind, EventLog};
use crate::notify::StatusMessage;
use crate::storage::{EventStore, MemoryStore, StorageError};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What the runtime must do with the process timer after a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerDirective {
    /// Leave the armed timer (if any) alone.
    Keep,
    /// Drop the armed timer.
    Cancel,
    /// Replace any armed timer with a new one.
    Arm { process: Process, after: Duration },
}

/// The events committed by one operation, plus the timer follow-up.
#[derive(Clone, Debug, PartialEq)]
pub struct EventBatch {
    pub events: Vec<Event>,
    pub timer: TimerDirective,
}

impl EventBatch {
    /// States entered by this batch, in order.
    pub fn transitions(&self) -> Vec<MachineState> {
        self.events.iter().filter_map(|e| e.new_state).collect()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events.iter().map(Event::event_type).collect()
    }
}

/// Accumulates the events of one decision.
struct Plan {
    kinds: Vec<EventKind>,
    /// Process to cancel on the first state change.
    preempt: Option<Process>,
}

impl Plan {
    fn new() -> Self {
        Self {
            kinds: Vec::new(),
            preempt: None,
        }
    }

    /// A plan for a command, which interrupts whatever process is pending.
    fn preempting(pending: Option<Process>) -> Self {
        Self {
            kinds: Vec::new(),
            preempt: pending,
        }
    }

    fn push(&mut self, kind: EventKind) {
        self.kinds.push(kind);
    }
}

/// The dispenser state machine.
pub struct Machine {
    instance: MachineInstance,
    log: EventLog,
    table: TransitionTable,
    thresholds: Thresholds,
    config: MachineConfig,
    store: Box<dyn EventStore>,
    durations: Box<dyn DurationSource>,
    changes_since_snapshot: u32,
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("instance", &self.instance)
            .field("last_seq", &self.log.last_seq())
            .finish_non_exhaustive()
    }
}

impl Machine {
    /// A fresh machine backed by an in-memory store.
    pub fn new(config: MachineConfig) -> Self {
        let durations = SimulatedDurations::from_config(&config);
        Self::from_parts(
            config,
            MachineInstance::new(),
            EventLog::new(),
            Box::new(MemoryStore::new()),
            Box::new(durations),
        )
    }

    /// Rebuild a machine from whatever the store holds.
    ///
    /// Replays from the latest snapshot when one exists, otherwise from
    /// the first event. An empty store yields a fresh machine in `Off`.
    pub fn open(
        config: MachineConfig,
        store: Box<dyn EventStore>,
        durations: Box<dyn DurationSource>,
    ) -> Result<Self, StorageError> {
        let events = store.events_since(0)?;
        let log = EventLog::from_events(events).map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let snapshot = match store.latest_snapshot()? {
            Some(s) if s.last_seq > log.last_seq() => {
                warn!(
                    snapshot_seq = s.last_seq,
                    log_seq = log.last_seq(),
                    "snapshot is ahead of the log, replaying from the start"
                );
                None
            }
            other => other,
        };

        let instance = log.replay(snapshot.as_ref());
        info!(
            state = %instance.state,
            events = log.len(),
            from_snapshot = snapshot.is_some(),
            "machine recovered"
        );
        Ok(Self::from_parts(config, instance, log, store, durations))
    }

    fn from_parts(
        config: MachineConfig,
        instance: MachineInstance,
        log: EventLog,
        store: Box<dyn EventStore>,
        durations: Box<dyn DurationSource>,
    ) -> Self {
        let thresholds = config.thresholds();
        Self {
            instance,
            log,
            table: TransitionTable::dispenser(thresholds),
            thresholds,
            config,
            store,
            durations,
            changes_since_snapshot: 0,
        }
    }

    pub fn instance(&self) -> &MachineInstance {
        &self.instance
    }

    pub fn state(&self) -> MachineState {
        self.instance.state
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Current status, as published after every accepted command.
    pub fn status(&self) -> StatusMessage {
        StatusMessage::from_instance(&self.instance, Utc::now())
    }

    /// Record that the machine came up.
    ///
    /// A machine recovered in the middle of a timed process re-arms that
    /// process from the start.
    pub fn start(&mut self) -> Result<EventBatch, CommandError> {
        let mut plan = Plan::new();
        plan.push(EventKind::SystemStarted);
        if let Some(process) = self.instance.pending {
            let after = self
                .durations
                .duration_for(process, self.instance.selected_beverage);
            info!(%process, "resuming interrupted process");
            plan.push(EventKind::ProcessScheduled {
                process,
                after_ms: after.as_millis() as u64,
            });
        }
        self.commit(plan)
    }

    /// Apply an external command.
    ///
    /// Illegal commands are rejected without recording anything.
    pub fn apply(&mut self, command: Command) -> Result<EventBatch, CommandError> {
        if let Err(err) = self.table.check(&self.instance, &command) {
            warn!(%command, state = %self.instance.state, error = %err, "command rejected");
            return Err(err);
        }
        debug!(%command, state = %self.instance.state, "applying command");

        let mut plan = Plan::preempting(self.instance.pending);
        self.decide(&mut plan, command);
        plan.push(EventKind::CommandReceived { command });
        self.commit(plan)
    }

    /// Complete a timed process.
    ///
    /// Returns `Ok(None)` when `process` is not the one currently pending,
    /// which is how a stale timer fire is discarded.
    pub fn complete(&mut self, process: Process) -> Result<Option<EventBatch>, CommandError> {
        if self.instance.pending != Some(process) {
            warn!(
                %process,
                pending = ?self.instance.pending,
                state = %self.instance.state,
                "ignoring stale process completion"
            );
            return Ok(None);
        }

        let mut plan = Plan::new();
        match process {
            Process::SelfCheck => self.finish_self_check(&mut plan),
            Process::SelectionTimeout => self.finish_selection_timeout(&mut plan),
            Process::Brew => self.finish_brew(&mut plan),
            Process::Cleaning => self.finish_cleaning(&mut plan),
        }
        self.commit(plan).map(Some)
    }

    /// Persist a snapshot of the current instance now.
    pub fn snapshot(&mut self) -> Result<Snapshot, CommandError> {
        let snapshot = Snapshot::capture(&self.instance, self.log.last_seq(), Utc::now());
        if let Err(err) = self.store.write_snapshot(&snapshot) {
            error!(error = %err, "snapshot write failed");
            return Err(err.into());
        }
        self.changes_since_snapshot = 0;
        info!(last_seq = snapshot.last_seq, "snapshot written");
        Ok(snapshot)
    }

    fn decide(&mut self, plan: &mut Plan, command: Command) {
        let state = self.instance.state;
        match command {
            Command::TurnOn => {
                if self.instance.resources.temperature != AMBIENT_TEMPERATURE {
                    plan.push(EventKind::TemperatureChanged {
                        temperature: AMBIENT_TEMPERATURE,
                    });
                }
                self.enter(plan, MachineState::SelfCheck, "power on");
            }
            Command::TurnOff => {
                if state == MachineState::Off {
                    return;
                }
                if self.instance.selected_beverage.is_some() {
                    plan.push(EventKind::SelectionCleared);
                }
                if let Some(kind) = self.instance.error_kind {
                    plan.push(EventKind::ErrorCleared { kind });
                }
                if self.instance.cup_present() {
                    plan.push(EventKind::CupRemoved);
                }
                self.enter(plan, MachineState::Off, "power off");
            }
            Command::PlaceCup => {
                plan.push(EventKind::CupPlaced);
                self.enter(plan, MachineState::AskBeverage, "cup placed");
            }
            Command::RemoveCup => {
                plan.push(EventKind::CupRemoved);
                match state {
                    MachineState::AskBeverage => {
                        if self.instance.selected_beverage.is_some() {
                            plan.push(EventKind::SelectionCleared);
                        }
                        self.enter(plan, MachineState::Ready, "cup removed");
                    }
                    MachineState::ProduceBeverage => {
                        plan.push(EventKind::SelectionCleared);
                        self.fail(plan, ErrorKind::CupMissing, "cup removed while brewing");
                    }
                    _ => {}
                }
            }
            Command::SelectBeverage { beverage } => {
                plan.push(EventKind::BeverageSelected { beverage });
            }
            Command::ConfirmSelection => {
                let Some(beverage) = self.instance.selected_beverage else {
                    return;
                };
                match self.instance.resources.depletion(&self.thresholds) {
                    Some(kind) => {
                        plan.push(EventKind::SelectionCleared);
                        self.fail(plan, kind, "not enough resources to brew");
                    }
                    None => {
                        let reason = format!("brewing {beverage}");
                        self.enter(plan, MachineState::ProduceBeverage, &reason);
                    }
                }
            }
            Command::StartCleaning => {
                plan.push(EventKind::CleaningTriggered { automatic: false });
                self.enter(plan, MachineState::SelfClean, "manual cleaning");
            }
            Command::ResetError => {
                if let Some(kind) = self.instance.error_kind {
                    plan.push(EventKind::ErrorCleared { kind });
                }
                self.enter(plan, MachineState::Ready, "error reset");
            }
            Command::RefillWater | Command::RefillCoffee => {
                if let Some(resource) = command.refill() {
                    plan.push(EventKind::ResourceRefilled { resource });
                }
            }
        }
    }

    /// Heat in fixed steps until the boiler reaches operating temperature.
    fn finish_self_check(&mut self, plan: &mut Plan) {
        let step = i16::from(self.config.heater_step);
        let mut resources = self.instance.resources;
        while step > 0 && resources.temperature < OPERATING_TEMPERATURE {
            resources = resources.heat(step);
        }

        if resources.temperature != self.instance.resources.temperature {
            plan.push(EventKind::TemperatureChanged {
                temperature: resources.temperature,
            });
        }
        if resources.temperature >= OPERATING_TEMPERATURE {
            self.enter(plan, MachineState::Ready, "self check passed");
        } else {
            self.fail(
                plan,
                ErrorKind::SystemError,
                "boiler did not reach operating temperature",
            );
        }
    }

    fn finish_selection_timeout(&mut self, plan: &mut Plan) {
        if self.instance.cup_present() {
            plan.push(EventKind::CupRemoved);
        }
        if self.instance.selected_beverage.is_some() {
            plan.push(EventKind::SelectionCleared);
        }
        self.enter(plan, MachineState::Ready, "selection timed out");
    }

    fn finish_brew(&mut self, plan: &mut Plan) {
        let Some(beverage) = self.instance.selected_beverage else {
            error!("brew finished without a selected beverage");
            self.fail(plan, ErrorKind::SystemError, "brew finished without a selection");
            return;
        };

        let spec = beverage.spec();
        let after = self.instance.resources.consume(spec.water, spec.coffee);
        let brewed = self.instance.resources.cleaning_cycles.saturating_add(1);

        plan.push(EventKind::ResourceConsumed {
            beverage,
            water: spec.water,
            coffee: spec.coffee,
        });
        plan.push(EventKind::BrewCompleted { beverage });
        plan.push(EventKind::SelectionCleared);
        info!(%beverage, water = after.water_level, coffee = after.coffee_level, "beverage ready");

        if let Some(kind) = after.depletion(&self.thresholds) {
            self.fail(plan, kind, "resource depleted after brewing");
        } else if brewed >= self.config.auto_clean_after {
            plan.push(EventKind::CleaningTriggered { automatic: true });
            self.enter(plan, MachineState::SelfClean, "automatic cleaning");
        } else if after.cup_present {
            self.enter(plan, MachineState::AskBeverage, &served(beverage));
        } else {
            self.enter(plan, MachineState::Ready, &served(beverage));
        }
    }

    fn finish_cleaning(&mut self, plan: &mut Plan) {
        if self.instance.resources.water_level < self.thresholds.water {
            self.fail(plan, ErrorKind::CleaningError, "not enough water to rinse");
        } else {
            plan.push(EventKind::CleaningCompleted);
            self.enter(plan, MachineState::Ready, "cleaning finished");
        }
    }

    fn fail(&mut self, plan: &mut Plan, kind: ErrorKind, reason: &str) {
        plan.push(EventKind::ErrorOccurred { kind });
        self.enter(plan, MachineState::Error, reason);
    }

    /// Emit the state change and arm the process of the target state.
    fn enter(&mut self, plan: &mut Plan, to: MachineState, reason: &str) {
        if let Some(process) = plan.preempt.take() {
            plan.push(EventKind::ProcessCancelled { process });
        }

        let from = self.instance.state;
        plan.push(EventKind::StateChanged {
            from,
            to,
            reason: reason.to_string(),
        });

        if let Some(process) = Process::on_entry(to) {
            let after = self
                .durations
                .duration_for(process, self.instance.selected_beverage);
            plan.push(EventKind::ProcessScheduled {
                process,
                after_ms: after.as_millis() as u64,
            });
        }
    }

    fn commit(&mut self, plan: Plan) -> Result<EventBatch, CommandError> {
        let now = Utc::now();
        let events = self.log.stage(self.instance.state, plan.kinds, now);
        let next = reducer::replay(self.instance.clone(), &events);

        let state_changes = events.iter().filter(|e| e.new_state.is_some()).count() as u32;
        let changes = self.changes_since_snapshot.saturating_add(state_changes);
        let last_seq = events.last().map_or(self.log.last_seq(), |e| e.seq);
        let snapshot = (state_changes > 0 && changes >= self.config.snapshot_interval)
            .then(|| Snapshot::capture(&next, last_seq, now));

        if let Err(err) = self.store.commit(&events, snapshot.as_ref()) {
            error!(error = %err, events = events.len(), "commit failed, machine unchanged");
            return Err(err.into());
        }

        self.changes_since_snapshot = if snapshot.is_some() { 0 } else { changes };
        let timer = timer_directive(&self.instance, &next, &events);

        for event in &events {
            if let EventKind::StateChanged { from, to, reason } = &event.kind {
                info!(seq = event.seq, %from, %to, reason = %reason, "state changed");
            }
            self.log.append(event.clone());
        }
        self.instance = next;

        Ok(EventBatch { events, timer })
    }
}

fn served(beverage: Beverage) -> String {
    format!("{beverage} served")
}

fn timer_directive(before: &MachineInstance, after: &MachineInstance, events: &[Event]) -> TimerDirective {
    let scheduled = events.iter().rev().find_map(|e| match e.kind {
        EventKind::ProcessScheduled { process, after_ms } => Some((process, after_ms)),
        _ => None,
    });

    match scheduled {
        Some((process, after_ms)) => TimerDirective::Arm {
            process,
            after: Duration::from_millis(after_ms),
        },
        None if before.pending.is_some() && after.pending.is_none() => TimerDirective::Cancel,
        None => TimerDirective::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::FixedDurations;

    fn config() -> MachineConfig {
        MachineConfig {
            seed: Some(7),
            ..MachineConfig::default()
        }
    }

    fn machine_with(store: MemoryStore) -> Machine {
        Machine::open(
            config(),
            Box::new(store),
            Box::new(FixedDurations(Duration::from_millis(10))),
        )
        .unwrap()
    }

    fn ready(store: MemoryStore) -> Machine {
        let mut machine = machine_with(store);
        machine.start().unwrap();
        machine.apply(Command::TurnOn).unwrap();
        machine.complete(Process::SelfCheck).unwrap();
        assert_eq!(machine.state(), MachineState::Ready);
        machine
    }

    fn brewing(beverage: Beverage) -> Machine {
        let mut machine = ready(MemoryStore::new());
        machine.apply(Command::PlaceCup).unwrap();
        machine
            .apply(Command::SelectBeverage { beverage })
            .unwrap();
        machine.apply(Command::ConfirmSelection).unwrap();
        machine
    }

    #[test]
    fn start_records_system_started() {
        let mut machine = machine_with(MemoryStore::new());
        let batch = machine.start().unwrap();
        assert_eq!(batch.event_types(), vec!["system_started"]);
        assert_eq!(batch.timer, TimerDirective::Keep);
        assert_eq!(machine.state(), MachineState::Off);
    }

    #[test]
    fn turn_on_arms_self_check() {
        let mut machine = machine_with(MemoryStore::new());
        let batch = machine.apply(Command::TurnOn).unwrap();

        assert_eq!(
            batch.event_types(),
            vec!["state_changed", "process_scheduled", "command_turn_on"]
        );
        assert_eq!(
            batch.timer,
            TimerDirective::Arm {
                process: Process::SelfCheck,
                after: Duration::from_millis(10)
            }
        );
        assert_eq!(machine.instance().pending, Some(Process::SelfCheck));
    }

    #[test]
    fn self_check_heats_to_operating_temperature() {
        let machine = ready(MemoryStore::new());
        assert_eq!(machine.instance().resources.temperature, OPERATING_TEMPERATURE);
        assert_eq!(machine.instance().pending, None);
    }

    #[test]
    fn self_check_without_heater_fails() {
        let mut machine = Machine::open(
            MachineConfig {
                heater_step: 0,
                ..config()
            },
            Box::new(MemoryStore::new()),
            Box::new(FixedDurations(Duration::ZERO)),
        )
        .unwrap();
        machine.apply(Command::TurnOn).unwrap();
        machine.complete(Process::SelfCheck).unwrap();

        assert_eq!(machine.state(), MachineState::Error);
        assert_eq!(machine.instance().error_kind, Some(ErrorKind::SystemError));
    }

    #[test]
    fn rejected_command_records_nothing() {
        let store = MemoryStore::new();
        let mut machine = machine_with(store.clone());
        let before = machine.log().len();

        let err = machine.apply(Command::PlaceCup).unwrap_err();
        assert!(matches!(err, CommandError::InvalidTransition { .. }));
        assert_eq!(machine.log().len(), before);
        assert!(store.events().is_empty());
    }

    #[test]
    fn brew_consumes_and_returns_to_selection() {
        let mut machine = brewing(Beverage::Espresso);
        assert_eq!(machine.state(), MachineState::ProduceBeverage);

        let batch = machine.complete(Process::Brew).unwrap().unwrap();
        assert_eq!(batch.transitions(), vec![MachineState::AskBeverage]);

        let instance = machine.instance();
        assert_eq!(instance.resources.water_level, 97);
        assert_eq!(instance.resources.coffee_level, 93);
        assert_eq!(instance.resources.cleaning_cycles, 1);
        assert_eq!(instance.selected_beverage, None);
        assert_eq!(instance.pending, Some(Process::SelectionTimeout));
    }

    #[test]
    fn confirm_cancels_selection_timeout() {
        let mut machine = ready(MemoryStore::new());
        machine.apply(Command::PlaceCup).unwrap();
        machine
            .apply(Command::SelectBeverage {
                beverage: Beverage::Americano,
            })
            .unwrap();
        let batch = machine.apply(Command::ConfirmSelection).unwrap();

        assert_eq!(
            batch.event_types(),
            vec![
                "process_cancelled",
                "state_changed",
                "process_scheduled",
                "command_confirm_selection"
            ]
        );
        assert_eq!(machine.complete(Process::SelectionTimeout).unwrap(), None);
        assert_eq!(machine.state(), MachineState::ProduceBeverage);
    }

    #[test]
    fn cup_removed_while_brewing_is_an_error() {
        let mut machine = brewing(Beverage::Cappuccino);
        let batch = machine.apply(Command::RemoveCup).unwrap();

        assert_eq!(batch.timer, TimerDirective::Cancel);
        assert_eq!(machine.state(), MachineState::Error);
        assert_eq!(machine.instance().error_kind, Some(ErrorKind::CupMissing));
        assert_eq!(machine.instance().resources.water_level, 100);
        assert_eq!(machine.complete(Process::Brew).unwrap(), None);
    }

    #[test]
    fn confirm_with_low_water_fails_before_brewing() {
        let mut machine = ready(MemoryStore::new());
        machine.instance.resources.water_level = 5;
        machine.apply(Command::PlaceCup).unwrap();
        machine
            .apply(Command::SelectBeverage {
                beverage: Beverage::Espresso,
            })
            .unwrap();
        machine.apply(Command::ConfirmSelection).unwrap();

        assert_eq!(machine.state(), MachineState::Error);
        assert_eq!(machine.instance().error_kind, Some(ErrorKind::WaterEmpty));
        assert_eq!(machine.instance().selected_beverage, None);
    }

    #[test]
    fn cleaning_with_low_water_fails() {
        let mut machine = ready(MemoryStore::new());
        machine.apply(Command::StartCleaning).unwrap();
        machine.instance.resources.water_level = 3;
        machine.complete(Process::Cleaning).unwrap();

        assert_eq!(machine.state(), MachineState::Error);
        assert_eq!(machine.instance().error_kind, Some(ErrorKind::CleaningError));
    }

    #[test]
    fn turn_off_in_off_only_records_command() {
        let mut machine = machine_with(MemoryStore::new());
        let batch = machine.apply(Command::TurnOff).unwrap();
        assert_eq!(batch.event_types(), vec!["command_turn_off"]);
        assert_eq!(machine.state(), MachineState::Off);
    }

    #[test]
    fn turn_off_cancels_pending_process() {
        let mut machine = machine_with(MemoryStore::new());
        machine.apply(Command::TurnOn).unwrap();
        let batch = machine.apply(Command::TurnOff).unwrap();

        assert_eq!(batch.timer, TimerDirective::Cancel);
        assert_eq!(machine.state(), MachineState::Off);
        assert_eq!(machine.complete(Process::SelfCheck).unwrap(), None);
    }

    #[test]
    fn failed_commit_leaves_machine_unchanged() {
        let store = MemoryStore::new();
        let mut machine = ready(store.clone());
        let before = machine.instance().clone();
        let logged = machine.log().len();

        store.fail_next_commits(1);
        let err = machine.apply(Command::PlaceCup).unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(machine.instance(), &before);
        assert_eq!(machine.log().len(), logged);

        machine.apply(Command::PlaceCup).unwrap();
        assert_eq!(machine.state(), MachineState::AskBeverage);
    }

    #[test]
    fn log_replay_matches_live_instance() {
        let mut machine = brewing(Beverage::Americano);
        machine.complete(Process::Brew).unwrap();
        machine.apply(Command::RemoveCup).unwrap();
        machine.apply(Command::RefillWater).unwrap();

        assert_eq!(&machine.log().replay(None), machine.instance());
    }

    #[test]
    fn reopen_restores_state() {
        let store = MemoryStore::new();
        let mut machine = ready(store.clone());
        machine.apply(Command::PlaceCup).unwrap();
        let expected = machine.instance().clone();
        drop(machine);

        let mut reopened = machine_with(store);
        assert_eq!(reopened.instance(), &expected);

        let batch = reopened.start().unwrap();
        assert_eq!(
            batch.timer,
            TimerDirective::Arm {
                process: Process::SelectionTimeout,
                after: Duration::from_millis(10)
            }
        );
    }

    #[test]
    fn snapshot_interval_controls_snapshot_writes() {
        let store = MemoryStore::new();
        let mut machine = Machine::open(
            MachineConfig {
                snapshot_interval: 2,
                ..config()
            },
            Box::new(store.clone()),
            Box::new(FixedDurations(Duration::ZERO)),
        )
        .unwrap();

        machine.apply(Command::TurnOn).unwrap();
        assert_eq!(store.snapshots_written(), 0);
        machine.complete(Process::SelfCheck).unwrap();
        assert_eq!(store.snapshots_written(), 1);

        let snapshot = machine.snapshot().unwrap();
        assert_eq!(snapshot.last_seq, machine.log().last_seq());
        assert_eq!(store.snapshots_written(), 2);
    }
}
