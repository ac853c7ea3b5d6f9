//! Legal commands per state, with the guards that qualify them.

use super::command::Command;
use crate::core::{ErrorKind, Guard, MachineInstance, MachineState, Thresholds};
use crate::error::CommandError;

/// One row of the transition table.
///
/// A command is accepted in `from` when the row's guard (if any) holds.
/// Where the command leads is decided by the machine core, which may
/// depend on more than the current state (for example resource levels).
#[derive(Debug)]
pub struct TransitionRule {
    pub from: MachineState,
    pub command: &'static str,
    pub guard: Option<Guard>,
}

impl TransitionRule {
    pub fn new(from: MachineState, command: &'static str) -> Self {
        Self {
            from,
            command,
            guard: None,
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Whether this rule matches the state and command name (pure).
    pub fn matches(&self, state: MachineState, command: &str) -> bool {
        self.from == state && self.command == command
    }
}

/// Lookup table deciding which commands each state accepts.
#[derive(Debug, Default)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add(&mut self, rule: TransitionRule) {
        self.rules.push(rule);
    }

    /// The dispenser's table.
    pub fn dispenser(thresholds: Thresholds) -> Self {
        use MachineState::*;

        let mut table = Self::new();

        table.add(TransitionRule::new(Off, "turn_on"));
        for state in MachineState::ALL {
            table.add(TransitionRule::new(state, "turn_off"));
            table.add(TransitionRule::new(state, "refill_water"));
            table.add(TransitionRule::new(state, "refill_coffee"));
        }

        table.add(TransitionRule::new(Ready, "place_cup").guarded(no_cup()));
        for state in [Ready, AskBeverage, ProduceBeverage, SelfClean, Error] {
            table.add(TransitionRule::new(state, "remove_cup").guarded(cup_present()));
        }

        table.add(TransitionRule::new(AskBeverage, "select_beverage"));
        table.add(TransitionRule::new(AskBeverage, "confirm_selection").guarded(Guard::new(
            "a beverage has been selected",
            |m: &MachineInstance| m.selected_beverage.is_some(),
        )));
        table.add(TransitionRule::new(Ready, "start_cleaning"));
        table.add(TransitionRule::new(Error, "reset_error").guarded(error_cleared(thresholds)));

        table
    }

    /// Whether `state` accepts `command` at all, ignoring guards.
    pub fn allows(&self, state: MachineState, command: &str) -> bool {
        self.rules.iter().any(|r| r.matches(state, command))
    }

    /// Commands accepted in `state`, ignoring guards.
    pub fn commands_for(&self, state: MachineState) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.from == state)
            .map(|r| r.command)
            .collect()
    }

    /// Decide whether the instance may run `command` right now.
    pub fn check(&self, instance: &MachineInstance, command: &Command) -> Result<(), CommandError> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.matches(instance.state, command.name()))
            .ok_or_else(|| CommandError::InvalidTransition {
                command: command.name(),
                state: instance.state,
                reason: "not accepted in this state".to_string(),
            })?;

        match &rule.guard {
            Some(guard) if !guard.check(instance) => Err(CommandError::InvalidTransition {
                command: command.name(),
                state: instance.state,
                reason: format!("requires {}", guard.description()),
            }),
            _ => Ok(()),
        }
    }
}

fn no_cup() -> Guard {
    Guard::new("no cup under the spout", |m: &MachineInstance| !m.cup_present())
}

fn cup_present() -> Guard {
    Guard::new("a cup under the spout", |m: &MachineInstance| m.cup_present())
}

/// The condition behind the current error no longer holds.
fn error_cleared(thresholds: Thresholds) -> Guard {
    Guard::new(
        "the cause of the error to be resolved",
        move |m: &MachineInstance| match m.error_kind {
            Some(ErrorKind::WaterEmpty) | Some(ErrorKind::CleaningError) => {
                m.resources.water_level >= thresholds.water
            }
            Some(ErrorKind::CoffeeEmpty) => m.resources.coffee_level >= thresholds.coffee,
            Some(ErrorKind::CupMissing) | Some(ErrorKind::SystemError) | None => true,
        },
    )
}
