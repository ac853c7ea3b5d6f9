//! Outbound status and event messages.

use crate::core::{Beverage, ErrorKind, MachineInstance, MachineState, Resources};
use crate::events::Event;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Snapshot of the machine published after every accepted command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub timestamp: DateTime<Utc>,
    pub state: MachineState,
    pub selected_beverage: Option<Beverage>,
    pub error_type: Option<ErrorKind>,
    pub resources: Resources,
    pub available_beverages: Vec<String>,
}

impl StatusMessage {
    pub fn from_instance(instance: &MachineInstance, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            state: instance.state,
            selected_beverage: instance.selected_beverage,
            error_type: instance.error_kind,
            resources: instance.resources,
            available_beverages: Beverage::menu().into_iter().map(String::from).collect(),
        }
    }
}

/// One logged event, as published to observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub timestamp: DateTime<Utc>,
    /// Outbound event name such as `state_changed` or `command_turn_on`.
    pub event: String,
    /// State of the machine right after the event.
    pub state: MachineState,
    pub data: Value,
}

impl EventMessage {
    pub fn from_event(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp,
            event: event.event_type(),
            state: event.resulting_state(),
            data: event.kind.data(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Status(StatusMessage),
    Event(EventMessage),
}

/// Receives notifications in the order the machine produced them.
///
/// Called from the machine's actor task, so implementations must not block.
pub trait NotificationSink: Send + Sync + 'static {
    fn publish(&self, notification: Notification);
}

/// Forwards notifications into an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn publish(&self, notification: Notification) {
        // A dropped receiver just means nobody is listening.
        let _ = self.tx.send(notification);
    }
}

/// Logs every notification at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, notification: Notification) {
        match notification {
            Notification::Status(status) => {
                debug!(
                    state = %status.state,
                    water = status.resources.water_level,
                    coffee = status.resources.coffee_level,
                    temperature = status.resources.temperature,
                    "status"
                );
            }
            Notification::Event(event) => {
                debug!(event = %event.event, state = %event.state, data = %event.data, "event");
            }
        }
    }
}
