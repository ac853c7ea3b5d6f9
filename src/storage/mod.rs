//! Durable storage for the event log and snapshots.
//!
//! The machine commits each batch of events (and, when due, a snapshot)
//! through [`EventStore::commit`] before it touches its in-memory state.
//! A failed commit therefore leaves both the store and the machine as
//! they were.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::checkpoint::Snapshot;
use crate::events::Event;

/// Errors raised by an [`EventStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt store: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Whether the failure is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unavailable(_))
    }
}

/// Append-only persistence for one machine.
pub trait EventStore: Send + 'static {
    /// Persist a batch of events and an optional snapshot as one unit.
    ///
    /// Either everything is stored or nothing is. Events arrive in
    /// sequence order and continue the stored log without gaps.
    fn commit(&mut self, events: &[Event], snapshot: Option<&Snapshot>)
        -> Result<(), StorageError>;

    /// Stored events with a sequence number strictly greater than `seq`.
    fn events_since(&self, seq: u64) -> Result<Vec<Event>, StorageError>;

    /// The most recent snapshot, if any.
    fn latest_snapshot(&self) -> Result<Option<Snapshot>, StorageError>;

    fn append_event(&mut self, event: &Event) -> Result<(), StorageError> {
        self.commit(std::slice::from_ref(event), None)
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StorageError> {
        self.commit(&[], Some(snapshot))
    }
}

impl<S: EventStore + ?Sized> EventStore for Box<S> {
    fn commit(
        &mut self,
        events: &[Event],
        snapshot: Option<&Snapshot>,
    ) -> Result<(), StorageError> {
        (**self).commit(events, snapshot)
    }

    fn events_since(&self, seq: u64) -> Result<Vec<Event>, StorageError> {
        (**self).events_since(seq)
    }

    fn latest_snapshot(&self) -> Result<Option<Snapshot>, StorageError> {
        (**self).latest_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(StorageError::Unavailable("down".into()).is_retryable());
        assert!(StorageError::Io(std::io::Error::other("disk")).is_retryable());
        assert!(!StorageError::Corrupt("bad line".into()).is_retryable());
    }

    #[test]
    fn boxed_store_delegates() {
        let mut store: Box<dyn EventStore> = Box::new(MemoryStore::new());
        assert!(store.latest_snapshot().unwrap().is_none());
        assert!(store.events_since(0).unwrap().is_empty());
        store.commit(&[], None).unwrap();
    }
}
