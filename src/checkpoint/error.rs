use thiserror::Error;

/// Why a snapshot could not be written or read back.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot as {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("failed to decode {format} snapshot: {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    #[error("snapshot format version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The decoded instance breaks a machine invariant.
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(&'static str),
}

impl SnapshotError {
    pub(crate) fn encode(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Encode {
            format,
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            format,
            message: err.to_string(),
        }
    }
}
