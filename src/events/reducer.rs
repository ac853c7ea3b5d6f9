//! Pure reducer folding events into a machine instance.
//!
//! `apply` is total: every event kind is handled and no input can make it
//! fail, so replaying the same ordered events always yields the same
//! instance.

use super::{Event, EventKind};
use crate::core::MachineInstance;

/// Apply a single event to produce the next instance.
pub fn apply(mut instance: MachineInstance, event: &Event) -> MachineInstance {
    match &event.kind {
        EventKind::SystemStarted | EventKind::CommandReceived { .. } => {}
        EventKind::StateChanged { to, .. } => {
            instance.previous_state = Some(instance.state);
            instance.state = *to;
            instance.pending = None;
        }
        EventKind::CupPlaced => instance.resources.cup_present = true,
        EventKind::CupRemoved => instance.resources.cup_present = false,
        EventKind::BeverageSelected { beverage } => instance.selected_beverage = Some(*beverage),
        EventKind::SelectionCleared => instance.selected_beverage = None,
        EventKind::ResourceConsumed { water, coffee, .. } => {
            instance.resources = instance.resources.consume(*water, *coffee);
        }
        EventKind::BrewCompleted { .. } => {
            instance.resources.cleaning_cycles = instance.resources.cleaning_cycles.saturating_add(1);
        }
        EventKind::ResourceRefilled { resource } => {
            instance.resources = instance.resources.refill(*resource);
        }
        EventKind::TemperatureChanged { temperature } => {
            instance.resources = instance.resources.with_temperature(*temperature);
        }
        EventKind::ErrorOccurred { kind } => instance.error_kind = Some(*kind),
        EventKind::ErrorCleared { .. } => instance.error_kind = None,
        EventKind::CleaningTriggered { .. } | EventKind::CleaningCompleted => {
            instance.resources.cleaning_cycles = 0;
        }
        EventKind::ProcessScheduled { process, .. } => instance.pending = Some(*process),
        EventKind::ProcessCancelled { .. } => instance.pending = None,
    }
    instance
}

/// Fold an ordered sequence of events onto a starting instance.
pub fn replay<'a, I>(start: MachineInstance, events: I) -> MachineInstance
where
    I: IntoIterator<Item = &'a Event>,
{
    events.into_iter().fold(start, apply)
}
