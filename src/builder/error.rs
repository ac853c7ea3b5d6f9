//! Errors raised while assembling a machine.

use crate::config::ConfigError;
use crate::error::CommandError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur when building or starting a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("could not recover machine from store: {0}")]
    Recovery(#[from] StorageError),

    #[error("could not start machine: {0}")]
    Start(#[from] CommandError),
}
