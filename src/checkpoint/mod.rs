//! Point-in-time snapshots of a machine.
//!
//! A snapshot is derived data: it records the instance after the event
//! with sequence `last_seq` so replay can start there instead of from the
//! beginning. The event log stays the source of truth.

use crate::core::{MachineInstance, MachineState, Resources};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable summary of a machine at one point in its event history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version.
    pub version: u32,

    /// Unique snapshot identifier.
    pub id: Uuid,

    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Sequence number of the last event folded into `instance`.
    pub last_seq: u64,

    /// The reconstructed machine.
    pub instance: MachineInstance,
}

impl Snapshot {
    /// Capture an instance as of event `last_seq`.
    pub fn capture(instance: &MachineInstance, last_seq: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            timestamp,
            last_seq,
            instance: instance.clone(),
        }
    }

    pub fn state(&self) -> MachineState {
        self.instance.state
    }

    pub fn resources(&self) -> &Resources {
        &self.instance.resources
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::encode("json", e))
    }

    /// Deserialize from JSON, rejecting unknown format versions.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| SnapshotError::decode("json", e))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Serialize to the compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::encode("bincode", e))
    }

    /// Deserialize from the compact binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| SnapshotError::decode("bincode", e))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if !self.instance.resources.in_bounds() {
            return Err(SnapshotError::Inconsistent("resource levels out of bounds"));
        }
        if self.instance.error_kind.is_some() != (self.instance.state == MachineState::Error) {
            return Err(SnapshotError::Inconsistent(
                "error kind present outside the error state",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Beverage, ErrorKind, Process};

    fn sample() -> Snapshot {
        let mut instance = MachineInstance::new();
        instance.state = MachineState::ProduceBeverage;
        instance.selected_beverage = Some(Beverage::Espresso);
        instance.pending = Some(Process::Brew);
        instance.resources.cup_present = true;
        Snapshot::capture(&instance, 12, Utc::now())
    }

    #[test]
    fn json_roundtrip_preserves_instance() {
        let snapshot = sample();
        let restored = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.state(), MachineState::ProduceBeverage);
        assert_eq!(restored.last_seq, 12);
    }

    #[test]
    fn binary_roundtrip_preserves_instance() {
        let snapshot = sample();
        let restored = Snapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut snapshot = sample();
        snapshot.version = 99;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(SnapshotError::UnsupportedVersion {
                found: 99,
                supported: 1
            })
        ));
    }

    #[test]
    fn rejects_error_kind_outside_error_state() {
        let mut snapshot = sample();
        snapshot.instance.error_kind = Some(ErrorKind::SystemError);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(SnapshotError::Inconsistent(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(SnapshotError::Decode { format: "json", .. })
        ));
        assert!(Snapshot::from_bytes(&[1, 2, 3]).is_err());
    }
}
