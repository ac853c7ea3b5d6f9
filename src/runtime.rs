//! Actor task that owns a machine and serializes everything it does.
//!
//! Commands from any number of [`MachineHandle`]s and fires from the
//! process timer all arrive on one `mpsc` channel and are handled one at
//! a time. The actor exclusively owns the [`Machine`] and the
//! [`Scheduler`], so no locking is needed and notifications leave in the
//! exact order the events were committed.

use crate::checkpoint::Snapshot;
use crate::core::{MachineInstance, Process};
use crate::dispatch::InboundCommand;
use crate::error::{CommandError, DispatchError};
use crate::events::Event;
use crate::machine::{Command, EventBatch, Machine, TimerDirective};
use crate::notify::{EventMessage, Notification, NotificationSink, StatusMessage};
use crate::scheduler::{Scheduler, TimerTicket};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, info_span, warn, Instrument};

type ApplyResult = Result<EventBatch, CommandError>;

/// Messages handled by the actor loop.
pub(crate) enum ActorMessage {
    Apply {
        command: Command,
        reply: oneshot::Sender<ApplyResult>,
    },
    Status {
        reply: oneshot::Sender<StatusMessage>,
    },
    Instance {
        reply: oneshot::Sender<MachineInstance>,
    },
    Events {
        since: u64,
        reply: oneshot::Sender<Vec<Event>>,
    },
    Snapshot {
        reply: oneshot::Sender<Result<Snapshot, CommandError>>,
    },
    ArmedTimer {
        reply: oneshot::Sender<Option<TimerTicket>>,
    },
    /// Sent by the scheduler when a process timer elapses.
    TimerFired { ticket: TimerTicket },
    Shutdown,
}

struct Actor {
    machine: Machine,
    scheduler: Scheduler,
    sink: Arc<dyn NotificationSink>,
    timers: mpsc::WeakSender<ActorMessage>,
    retry_backoff: Duration,
}

impl Actor {
    async fn run(mut self, mut rx: mpsc::Receiver<ActorMessage>) {
        while let Some(msg) = rx.recv().await {
            if !self.handle(msg) {
                break;
            }
        }
        info!(state = %self.machine.state(), "machine actor stopped");
    }

    /// Handle one message. Returns `false` when the actor should stop.
    fn handle(&mut self, msg: ActorMessage) -> bool {
        match msg {
            ActorMessage::Apply { command, reply } => {
                let _span = info_span!("command", command = command.name()).entered();
                let result = self.machine.apply(command);
                if let Ok(batch) = &result {
                    self.follow_up(batch);
                    self.publish_status();
                }
                let _ = reply.send(result);
            }
            ActorMessage::Status { reply } => {
                let _ = reply.send(self.machine.status());
            }
            ActorMessage::Instance { reply } => {
                let _ = reply.send(self.machine.instance().clone());
            }
            ActorMessage::Events { since, reply } => {
                let _ = reply.send(self.machine.log().since(since).to_vec());
            }
            ActorMessage::Snapshot { reply } => {
                let _ = reply.send(self.machine.snapshot());
            }
            ActorMessage::ArmedTimer { reply } => {
                let _ = reply.send(self.scheduler.active());
            }
            ActorMessage::TimerFired { ticket } => {
                let _span = info_span!("timer", process = %ticket.process).entered();
                self.on_timer(ticket);
            }
            ActorMessage::Shutdown => return false,
        }
        true
    }

    fn on_timer(&mut self, ticket: TimerTicket) {
        if !self.scheduler.settle(ticket) {
            debug!(generation = ticket.generation, "discarding stale timer fire");
            return;
        }

        match self.machine.complete(ticket.process) {
            Ok(Some(batch)) => {
                self.follow_up(&batch);
                self.publish_status();
            }
            Ok(None) => {}
            Err(err) => {
                // The process is still pending in the machine; try again later.
                error!(error = %err, "process completion failed, retrying");
                self.arm(ticket.process, self.retry_backoff);
            }
        }
    }

    /// Program the timer and publish the batch's events.
    fn follow_up(&mut self, batch: &EventBatch) {
        match batch.timer {
            TimerDirective::Keep => {}
            TimerDirective::Cancel => {
                self.scheduler.cancel_active();
            }
            TimerDirective::Arm { process, after } => self.arm(process, after),
        }
        for event in &batch.events {
            self.sink
                .publish(Notification::Event(EventMessage::from_event(event)));
        }
    }

    fn arm(&mut self, process: Process, after: Duration) {
        let timers = self.timers.clone();
        self.scheduler.schedule(process, after, move |ticket| async move {
            if let Some(tx) = timers.upgrade() {
                let _ = tx.send(ActorMessage::TimerFired { ticket }).await;
            }
        });
    }

    fn publish_status(&self) {
        self.sink.publish(Notification::Status(self.machine.status()));
    }
}

/// Start a machine on its own actor task and return a handle to it.
///
/// Records `system_started` (re-arming any process the machine was in
/// the middle of) before the actor accepts commands. Must be called from
/// within a tokio runtime.
pub fn spawn_machine(
    mut machine: Machine,
    sink: Arc<dyn NotificationSink>,
) -> Result<MachineHandle, CommandError> {
    let capacity = machine.config().channel_capacity.max(1);
    let retry_backoff = machine.config().retry_backoff();
    let started = machine.start()?;

    let (tx, rx) = mpsc::channel(capacity);
    let mut actor = Actor {
        machine,
        scheduler: Scheduler::new(),
        sink,
        timers: tx.downgrade(),
        retry_backoff,
    };
    actor.follow_up(&started);
    actor.publish_status();

    let span = info_span!("machine");
    tokio::spawn(actor.run(rx).instrument(span));
    Ok(MachineHandle { sender: tx })
}

/// Async handle to a running machine.
///
/// Cheap to clone; every clone talks to the same actor.
#[derive(Clone, Debug)]
pub struct MachineHandle {
    sender: mpsc::Sender<ActorMessage>,
}

impl MachineHandle {
    /// Validate an inbound message and apply it.
    ///
    /// A malformed message is rejected here and never reaches the actor.
    pub async fn dispatch(&self, inbound: &InboundCommand) -> Result<EventBatch, DispatchError> {
        let command = inbound.parse().map_err(|err| {
            warn!(source = %inbound.source, error = %err, "malformed command");
            err
        })?;
        self.apply(command).await
    }

    /// Decode, validate and apply a raw JSON message.
    pub async fn dispatch_json(&self, json: &str) -> Result<EventBatch, DispatchError> {
        let inbound = InboundCommand::from_json(json)?;
        self.dispatch(&inbound).await
    }

    /// Apply a typed command.
    pub async fn apply(&self, command: Command) -> Result<EventBatch, DispatchError> {
        let result = self
            .request(|reply| ActorMessage::Apply { command, reply })
            .await?;
        Ok(result?)
    }

    pub async fn status(&self) -> Result<StatusMessage, DispatchError> {
        self.request(|reply| ActorMessage::Status { reply }).await
    }

    pub async fn instance(&self) -> Result<MachineInstance, DispatchError> {
        self.request(|reply| ActorMessage::Instance { reply }).await
    }

    /// Logged events with a sequence number greater than `since`.
    pub async fn events_since(&self, since: u64) -> Result<Vec<Event>, DispatchError> {
        self.request(|reply| ActorMessage::Events { since, reply })
            .await
    }

    /// Persist a snapshot now.
    pub async fn snapshot(&self) -> Result<Snapshot, DispatchError> {
        let result = self
            .request(|reply| ActorMessage::Snapshot { reply })
            .await?;
        Ok(result?)
    }

    /// The process timer currently armed, if any.
    pub async fn armed_timer(&self) -> Result<Option<TimerTicket>, DispatchError> {
        self.request(|reply| ActorMessage::ArmedTimer { reply })
            .await
    }

    /// Stop the actor. Pending timers are dropped.
    pub async fn shutdown(&self) -> Result<(), DispatchError> {
        self.sender
            .send(ActorMessage::Shutdown)
            .await
            .map_err(|_| DispatchError::ActorGone)
    }

    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> ActorMessage,
    ) -> Result<T, DispatchError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(message(tx))
            .await
            .map_err(|_| DispatchError::ActorGone)?;
        rx.await.map_err(|_| DispatchError::ActorGone)
    }
}
