use super::{EventStore, StorageError};
use crate::checkpoint::Snapshot;
use crate::events::Event;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    /// Only the newest snapshot is kept; older ones are never read.
    snapshot: Option<Snapshot>,
    snapshots_written: usize,
    fail_commits: usize,
}

/// In-memory store.
///
/// Clones share the same contents, so a test can hand one clone to the
/// machine and keep another to inspect what was written or to inject
/// failures.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` commits fail with [`StorageError::Unavailable`].
    pub fn fail_next_commits(&self, count: usize) {
        self.lock().fail_commits = count;
    }

    /// Every stored event, in order.
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// How many snapshots have been written over the store's lifetime.
    pub fn snapshots_written(&self) -> usize {
        self.lock().snapshots_written
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventStore for MemoryStore {
    fn commit(
        &mut self,
        events: &[Event],
        snapshot: Option<&Snapshot>,
    ) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.fail_commits > 0 {
            inner.fail_commits -= 1;
            return Err(StorageError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }

        let mut expected = inner.events.last().map_or(0, |e| e.seq) + 1;
        for event in events {
            if event.seq != expected {
                return Err(StorageError::Corrupt(format!(
                    "event {} does not continue the log at {expected}",
                    event.seq
                )));
            }
            expected += 1;
        }

        inner.events.extend_from_slice(events);
        if let Some(snapshot) = snapshot {
            inner.snapshot = Some(snapshot.clone());
            inner.snapshots_written += 1;
        }
        Ok(())
    }

    fn events_since(&self, seq: u64) -> Result<Vec<Event>, StorageError> {
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|e| e.seq > seq)
            .cloned()
            .collect())
    }

    fn latest_snapshot(&self) -> Result<Option<Snapshot>, StorageError> {
        Ok(self.lock().snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MachineInstance, MachineState};
    use crate::events::{EventKind, EventLog};
    use chrono::Utc;

    fn staged(count: usize) -> Vec<Event> {
        EventLog::new().stage(
            MachineState::Off,
            vec![EventKind::SystemStarted; count],
            Utc::now(),
        )
    }

    #[test]
    fn commit_appends_events_and_snapshot() {
        let mut store = MemoryStore::new();
        let events = staged(2);
        let snapshot = Snapshot::capture(&MachineInstance::new(), 2, Utc::now());

        store.commit(&events, Some(&snapshot)).unwrap();

        assert_eq!(store.events(), events);
        assert_eq!(store.latest_snapshot().unwrap(), Some(snapshot));
        assert_eq!(store.events_since(1).unwrap().len(), 1);
    }

    #[test]
    fn keeps_only_the_newest_snapshot() {
        let mut store = MemoryStore::new();
        let events = staged(2);
        let first = Snapshot::capture(&MachineInstance::new(), 1, Utc::now());
        let second = Snapshot::capture(&MachineInstance::new(), 2, Utc::now());

        store.commit(&events[..1], Some(&first)).unwrap();
        store.commit(&events[1..], Some(&second)).unwrap();

        assert_eq!(store.snapshots_written(), 2);
        assert_eq!(store.latest_snapshot().unwrap(), Some(second));
    }

    #[test]
    fn injected_failure_stores_nothing() {
        let mut store = MemoryStore::new();
        let observer = store.clone();
        observer.fail_next_commits(1);

        assert!(store.commit(&staged(1), None).is_err());
        assert!(observer.events().is_empty());

        store.commit(&staged(1), None).unwrap();
        assert_eq!(observer.events().len(), 1);
    }

    #[test]
    fn rejects_non_contiguous_batch() {
        let mut store = MemoryStore::new();
        store.commit(&staged(1), None).unwrap();

        let err = store.commit(&staged(1), None).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
        assert_eq!(store.events().len(), 1);
    }
}
