//! Single-slot process timer.
//!
//! At most one timer is armed at a time. Arming a new one aborts the old
//! one, and every timer carries a ticket with a generation number so a
//! fire that raced with a cancellation can be recognised and dropped.

use crate::core::Process;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifies one armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerTicket {
    pub generation: u64,
    pub process: Process,
}

#[derive(Debug)]
struct ActiveTimer {
    ticket: TimerTicket,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    generation: u64,
    active: Option<ActiveTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for `process`, replacing any armed one.
    ///
    /// After `after` elapses `on_fire` runs with the timer's ticket. Must
    /// be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, process: Process, after: Duration, on_fire: F) -> TimerTicket
    where
        F: FnOnce(TimerTicket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel_active();
        self.generation += 1;
        let ticket = TimerTicket {
            generation: self.generation,
            process,
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            on_fire(ticket).await;
        });
        debug!(%process, generation = ticket.generation, after_ms = after.as_millis() as u64, "timer armed");

        self.active = Some(ActiveTimer { ticket, handle });
        ticket
    }

    /// Abort the armed timer, if any. Calling it twice is harmless.
    pub fn cancel_active(&mut self) -> Option<TimerTicket> {
        let active = self.active.take()?;
        active.handle.abort();
        debug!(process = %active.ticket.process, generation = active.ticket.generation, "timer cancelled");
        Some(active.ticket)
    }

    pub fn is_current(&self, ticket: TimerTicket) -> bool {
        self.active.as_ref().is_some_and(|a| a.ticket == ticket)
    }

    /// Accept a fired ticket.
    ///
    /// Returns `true` and disarms the slot when `ticket` is the armed
    /// timer; returns `false` for a stale fire.
    pub fn settle(&mut self, ticket: TimerTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.active = None;
        true
    }

    /// Ticket of the armed timer.
    pub fn active(&self) -> Option<TimerTicket> {
        self.active.as_ref().map(|a| a.ticket)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn forward(tx: mpsc::UnboundedSender<TimerTicket>) -> impl FnOnce(TimerTicket) -> std::future::Ready<()> {
        move |ticket| {
            let _ = tx.send(ticket);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        let ticket = scheduler.schedule(Process::Brew, Duration::from_secs(3), forward(tx));

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, ticket);
        assert!(scheduler.settle(fired));
        assert_eq!(scheduler.active(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_aborts_previous_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        let first = scheduler.schedule(Process::SelectionTimeout, Duration::from_secs(30), forward(tx.clone()));
        let second = scheduler.schedule(Process::Brew, Duration::from_secs(3), forward(tx));

        assert_ne!(first.generation, second.generation);
        assert_eq!(rx.recv().await, Some(second));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_ticket_is_not_settled() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        let old = scheduler.schedule(Process::SelfCheck, Duration::from_secs(5), forward(tx.clone()));
        scheduler.schedule(Process::SelfCheck, Duration::from_secs(5), forward(tx));

        assert!(!scheduler.is_current(old));
        assert!(!scheduler.settle(old));
        assert!(scheduler.active().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler::new();
        let ticket = scheduler.schedule(Process::Cleaning, Duration::from_secs(8), forward(tx));

        assert_eq!(scheduler.cancel_active(), Some(ticket));
        assert_eq!(scheduler.cancel_active(), None);
        assert!(!scheduler.settle(ticket));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }
}
