//! Append-only event log.
//!
//! The log never deletes or reorders entries. Sequence numbers start at 1
//! and are gap-free for the lifetime of the log.

use super::reducer;
use super::{Event, EventKind};
use crate::checkpoint::Snapshot;
use crate::core::{MachineInstance, MachineState};
use chrono::{DateTime, Utc};

/// Errors raised when loading a log from persisted events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("event sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },
}

/// Ordered, append-only sequence of events.
///
/// # Example
///
/// ```rust
/// use brewstate::events::{EventKind, EventLog};
/// use brewstate::core::MachineState;
/// use chrono::Utc;
///
/// let mut log = EventLog::new();
/// let staged = log.stage(MachineState::Off, vec![EventKind::SystemStarted], Utc::now());
/// for event in staged {
///     log.append(event);
/// }
///
/// assert_eq!(log.last_seq(), 1);
/// assert_eq!(log.replay(None).state, MachineState::Off);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Rebuild a log from persisted events, checking they are contiguous.
    pub fn from_events(events: Vec<Event>) -> Result<Self, LogError> {
        for (index, event) in events.iter().enumerate() {
            let expected = index as u64 + 1;
            if event.seq != expected {
                return Err(LogError::SequenceGap {
                    expected,
                    found: event.seq,
                });
            }
        }
        Ok(Self { events })
    }

    /// Sequence number of the newest event, or 0 for an empty log.
    pub fn last_seq(&self) -> u64 {
        self.events.last().map_or(0, |e| e.seq)
    }

    /// Sequence number the next appended event will receive.
    pub fn next_seq(&self) -> u64 {
        self.last_seq() + 1
    }

    /// Turn event kinds into fully formed events without appending them.
    ///
    /// Sequence numbers continue from the current tail and each event
    /// records the state the machine was in when it was produced. The log
    /// is left untouched so a failed persist leaves no trace.
    pub fn stage(
        &self,
        current: MachineState,
        kinds: Vec<EventKind>,
        timestamp: DateTime<Utc>,
    ) -> Vec<Event> {
        let mut state = current;
        let mut seq = self.next_seq();
        kinds
            .into_iter()
            .map(|kind| {
                let previous_state = state;
                let new_state = match &kind {
                    EventKind::StateChanged { to, .. } => {
                        state = *to;
                        Some(*to)
                    }
                    _ => None,
                };
                let event = Event {
                    seq,
                    timestamp,
                    previous_state,
                    new_state,
                    kind,
                };
                seq += 1;
                event
            })
            .collect()
    }

    /// Append an event, assigning it the next sequence number.
    pub fn append(&mut self, mut event: Event) -> u64 {
        let seq = self.next_seq();
        event.seq = seq;
        self.events.push(event);
        seq
    }

    /// All events in sequence order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events with a sequence number strictly greater than `seq`.
    pub fn since(&self, seq: u64) -> &[Event] {
        let start = self.events.partition_point(|e| e.seq <= seq);
        &self.events[start..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Reconstruct the machine by folding events in order.
    ///
    /// Starts from the snapshot when one is given (only later events are
    /// folded), otherwise from a fresh machine in `Off`.
    pub fn replay(&self, from: Option<&Snapshot>) -> MachineInstance {
        match from {
            Some(snapshot) => {
                reducer::replay(snapshot.instance.clone(), self.since(snapshot.last_seq))
            }
            None => reducer::replay(MachineInstance::new(), &self.events),
        }
    }

    /// The sequence of states traversed, starting from `Off`.
    pub fn state_path(&self) -> Vec<MachineState> {
        let mut path = vec![MachineState::Off];
        path.extend(self.events.iter().filter_map(|e| e.new_state));
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Beverage, ErrorKind};

    fn change(from: MachineState, to: MachineState) -> EventKind {
        EventKind::StateChanged {
            from,
            to,
            reason: String::new(),
        }
    }

    fn log_with(kinds: Vec<EventKind>) -> EventLog {
        let mut log = EventLog::new();
        for event in log.stage(MachineState::Off, kinds, Utc::now()) {
            log.append(event);
        }
        log
    }

    #[test]
    fn new_log_is_empty() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.last_seq(), 0);
        assert_eq!(log.next_seq(), 1);
        assert_eq!(log.state_path(), vec![MachineState::Off]);
    }

    #[test]
    fn stage_does_not_append() {
        let log = EventLog::new();
        let staged = log.stage(MachineState::Off, vec![EventKind::SystemStarted], Utc::now());
        assert_eq!(staged.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn stage_tracks_state_through_batch() {
        let log = EventLog::new();
        let staged = log.stage(
            MachineState::Ready,
            vec![
                EventKind::CupPlaced,
                change(MachineState::Ready, MachineState::AskBeverage),
                EventKind::CommandReceived {
                    command: crate::machine::Command::PlaceCup,
                },
            ],
            Utc::now(),
        );

        assert_eq!(staged[0].previous_state, MachineState::Ready);
        assert_eq!(staged[0].new_state, None);
        assert_eq!(staged[1].previous_state, MachineState::Ready);
        assert_eq!(staged[1].new_state, Some(MachineState::AskBeverage));
        assert_eq!(staged[2].previous_state, MachineState::AskBeverage);
        let seqs: Vec<u64> = staged.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn append_is_gap_free() {
        let log = log_with(vec![
            EventKind::SystemStarted,
            change(MachineState::Off, MachineState::SelfCheck),
            change(MachineState::SelfCheck, MachineState::Ready),
        ]);
        let seqs: Vec<u64> = log.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn since_returns_later_events() {
        let log = log_with(vec![
            EventKind::SystemStarted,
            EventKind::CupPlaced,
            EventKind::CupRemoved,
        ]);
        assert_eq!(log.since(0).len(), 3);
        assert_eq!(log.since(2).len(), 1);
        assert_eq!(log.since(2)[0].kind, EventKind::CupRemoved);
        assert!(log.since(3).is_empty());
    }

    #[test]
    fn from_events_rejects_gaps() {
        let mut events = log_with(vec![EventKind::SystemStarted, EventKind::CupPlaced])
            .events()
            .to_vec();
        events[1].seq = 5;
        assert_eq!(
            EventLog::from_events(events).unwrap_err(),
            LogError::SequenceGap {
                expected: 2,
                found: 5
            }
        );
    }

    #[test]
    fn state_path_follows_changes() {
        let log = log_with(vec![
            change(MachineState::Off, MachineState::SelfCheck),
            EventKind::TemperatureChanged { temperature: 90 },
            change(MachineState::SelfCheck, MachineState::Ready),
        ]);
        assert_eq!(
            log.state_path(),
            vec![MachineState::Off, MachineState::SelfCheck, MachineState::Ready]
        );
    }

    #[test]
    fn replay_from_snapshot_skips_folded_events() {
        let log = log_with(vec![
            change(MachineState::Off, MachineState::SelfCheck),
            change(MachineState::SelfCheck, MachineState::Ready),
            EventKind::CupPlaced,
            change(MachineState::Ready, MachineState::AskBeverage),
            EventKind::BeverageSelected {
                beverage: Beverage::Espresso,
            },
        ]);

        let midway = reducer::replay(MachineInstance::new(), &log.events()[..3]);
        let snapshot = Snapshot::capture(&midway, 3, Utc::now());

        assert_eq!(log.replay(Some(&snapshot)), log.replay(None));
    }

    #[test]
    fn replay_reconstructs_error() {
        let log = log_with(vec![
            change(MachineState::Off, MachineState::SelfCheck),
            EventKind::ErrorOccurred {
                kind: ErrorKind::SystemError,
            },
            change(MachineState::SelfCheck, MachineState::Error),
        ]);
        let instance = log.replay(None);
        assert_eq!(instance.state, MachineState::Error);
        assert_eq!(instance.error_kind, Some(ErrorKind::SystemError));
        assert_eq!(instance.previous_state, Some(MachineState::SelfCheck));
    }
}
