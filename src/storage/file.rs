//! Directory-backed store.
//!
//! Layout:
//!
//! ```text
//! <dir>/events.jsonl    one JSON event per line, append-only
//! <dir>/snapshot.json   latest snapshot, replaced atomically
//! ```

use super::{EventStore, StorageError};
use crate::checkpoint::Snapshot;
use crate::events::Event;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const EVENTS_FILE: &str = "events.jsonl";
const SNAPSHOT_FILE: &str = "snapshot.json";

/// Persists one machine's log and snapshot under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn events_path(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// Write the snapshot to a temp file, then rename over the old one.
    fn replace_snapshot(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let json = snapshot
            .to_json()
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        {
            let mut file = File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.snapshot_path())?;
        Ok(())
    }
}

impl EventStore for FileStore {
    fn commit(
        &mut self,
        events: &[Event],
        snapshot: Option<&Snapshot>,
    ) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        for event in events {
            serde_json::to_writer(&mut buf, event)?;
            buf.push(b'\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path())?;
        let committed_len = file.metadata()?.len();

        let written = file
            .write_all(&buf)
            .and_then(|()| file.sync_data())
            .map_err(StorageError::from)
            .and_then(|()| match snapshot {
                Some(snapshot) => self.replace_snapshot(snapshot),
                None => Ok(()),
            });

        if let Err(err) = written {
            // Drop the partial batch so the log ends at the last full commit.
            if let Err(truncate_err) = file.set_len(committed_len) {
                warn!(error = %truncate_err, "failed to roll back partial event batch");
            }
            return Err(err);
        }
        Ok(())
    }

    fn events_since(&self, seq: u64) -> Result<Vec<Event>, StorageError> {
        let file = match File::open(self.events_path()) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut events = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(&line).map_err(|e| {
                StorageError::Corrupt(format!("{EVENTS_FILE} line {}: {e}", index + 1))
            })?;
            if event.seq > seq {
                events.push(event);
            }
        }
        Ok(events)
    }

    fn latest_snapshot(&self) -> Result<Option<Snapshot>, StorageError> {
        let json = match fs::read_to_string(self.snapshot_path()) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // A snapshot is derived data; an unreadable one is just a cache miss.
        match Snapshot::from_json(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable snapshot");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MachineInstance, MachineState};
    use crate::events::{EventKind, EventLog};
    use chrono::Utc;

    fn staged(log: &EventLog, kinds: Vec<EventKind>) -> Vec<Event> {
        log.stage(MachineState::Off, kinds, Utc::now())
    }

    #[test]
    fn empty_directory_has_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.events_since(0).unwrap().is_empty());
        assert!(store.latest_snapshot().unwrap().is_none());
    }

    #[test]
    fn events_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = EventLog::new();
        let events = staged(&log, vec![EventKind::SystemStarted, EventKind::CupPlaced]);
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.commit(&events, None).unwrap();
        }
        for event in events.iter().cloned() {
            log.append(event);
        }
        let more = staged(&log, vec![EventKind::CupRemoved]);
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.commit(&more, None).unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        let loaded = store.events_since(0).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[..2], events[..]);
        assert_eq!(loaded[2].kind, EventKind::CupRemoved);
        assert_eq!(store.events_since(2).unwrap().len(), 1);
    }

    #[test]
    fn snapshot_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        let first = Snapshot::capture(&MachineInstance::new(), 1, Utc::now());
        store.write_snapshot(&first).unwrap();
        let second = Snapshot::capture(&MachineInstance::new(), 4, Utc::now());
        store.write_snapshot(&second).unwrap();

        assert_eq!(store.latest_snapshot().unwrap(), Some(second));
        assert!(!dir.path().join("snapshot.json.tmp").exists());
    }

    #[test]
    fn unreadable_snapshot_is_a_cache_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(dir.path().join(SNAPSHOT_FILE), "{garbage").unwrap();
        assert!(store.latest_snapshot().unwrap().is_none());
    }

    #[test]
    fn corrupt_event_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(dir.path().join(EVENTS_FILE), "not json\n").unwrap();
        assert!(matches!(
            store.events_since(0),
            Err(StorageError::Corrupt(_))
        ));
    }
}
