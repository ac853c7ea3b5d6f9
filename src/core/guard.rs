//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the machine instance that decide
//! whether an otherwise legal command may run. They keep preconditions
//! declarative and free of side effects.

use super::instance::MachineInstance;
use std::fmt;

/// Pure predicate that determines if a transition can execute.
///
/// Each guard carries a short description that is reported back to the
/// caller when it blocks a command.
///
/// # Example
///
/// ```rust
/// use brewstate::core::{Guard, MachineInstance};
///
/// let has_cup = Guard::new("a cup is present", |m: &MachineInstance| m.cup_present());
///
/// let mut instance = MachineInstance::new();
/// assert!(!has_cup.check(&instance));
///
/// instance.resources.cup_present = true;
/// assert!(has_cup.check(&instance));
/// ```
pub struct Guard {
    description: &'static str,
    predicate: Box<dyn Fn(&MachineInstance) -> bool + Send + Sync>,
}

impl Guard {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe.
    pub fn new<F>(description: &'static str, predicate: F) -> Self
    where
        F: Fn(&MachineInstance) -> bool + Send + Sync + 'static,
    {
        Guard {
            description,
            predicate: Box::new(predicate),
        }
    }

    /// Check if the guard allows a transition from this instance.
    pub fn check(&self, instance: &MachineInstance) -> bool {
        (self.predicate)(instance)
    }

    /// What must hold for the guard to pass.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Beverage, MachineState};

    #[test]
    fn guard_allows_matching_instances() {
        let guard = Guard::new("machine is ready", |m: &MachineInstance| {
            m.state == MachineState::Ready
        });

        let mut instance = MachineInstance::new();
        assert!(!guard.check(&instance));

        instance.state = MachineState::Ready;
        assert!(guard.check(&instance));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new("a beverage is selected", |m: &MachineInstance| {
            m.selected_beverage.is_some()
        });
        let mut instance = MachineInstance::new();
        instance.selected_beverage = Some(Beverage::Espresso);

        assert_eq!(guard.check(&instance), guard.check(&instance));
    }

    #[test]
    fn description_is_reported() {
        let guard = Guard::new("a cup is present", |m: &MachineInstance| m.cup_present());
        assert_eq!(guard.description(), "a cup is present");
        assert!(format!("{guard:?}").contains("a cup is present"));
    }
}
