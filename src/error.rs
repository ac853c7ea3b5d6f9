//! Crate-level error types for applying and dispatching commands.

use crate::core::MachineState;
use crate::dispatch::MalformedCommand;
use crate::storage::StorageError;

/// Error returned when the state machine core refuses or fails a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command is not legal in the current state.
    ///
    /// Nothing changed and no event was recorded.
    #[error("command '{command}' is not allowed in state '{state}': {reason}")]
    InvalidTransition {
        command: &'static str,
        state: MachineState,
        reason: String,
    },

    /// Persisting the transition failed.
    ///
    /// The in-memory machine was left exactly as it was before the
    /// command, so the command can be retried.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl CommandError {
    /// Whether retrying the same command may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Error returned by [`MachineHandle`](crate::runtime::MachineHandle) operations.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The inbound message failed validation before reaching the core.
    #[error(transparent)]
    Malformed(#[from] MalformedCommand),

    /// The core rejected or failed the command.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The actor task owning the machine has exited.
    #[error("machine actor is no longer running")]
    ActorGone,
}

impl DispatchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Command(err) if err.is_retryable())
    }
}
