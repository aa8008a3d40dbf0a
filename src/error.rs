//! Unified error types for renc.
//!
//! This module provides a user-facing error type that wraps the runtime's
//! internal errors and adds the failures of the facade itself
//! (configuration parsing).

use renc_core::CellKind;
use thiserror::Error;

/// All renc errors.
///
/// Runtime errors are grouped by what the caller can do about them:
/// lifecycle misuse, exhaustion, wrong kind, and ownership bugs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Runtime in the wrong lifecycle state for the call
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Arena at its configured hard capacity, or growth refused by the allocator
    #[error("out of memory: arena capacity of {capacity} cells exhausted")]
    OutOfMemory {
        /// Configured maximum number of slots
        capacity: usize,
    },

    /// Accessor does not match the cell kind
    #[error("wrong type: expected {expected}, got {actual}")]
    WrongType {
        /// Kind the accessor reads
        expected: CellKind,
        /// Kind the cell holds
        actual: CellKind,
    },

    /// Handle that never referred to a cell or whose cell is gone
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    /// Reference-count misuse (over-release, double free)
    #[error("ownership violation: {0}")]
    Ownership(String),

    /// Rejected runtime configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration could not be parsed
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for renc operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the error points at a bug in the caller.
    ///
    /// Such errors never go away by retrying the same call.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Error::WrongType { .. } | Error::InvalidHandle(_) | Error::Ownership(_)
        )
    }

    /// Check if this is a lifecycle error.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }

    /// Check if the arena ran out of slots.
    ///
    /// Releasing cells and retrying may succeed.
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Error::OutOfMemory { .. })
    }
}

// Convert from internal runtime errors
impl From<renc_core::Error> for Error {
    fn from(e: renc_core::Error) -> Self {
        use renc_core::Error as CoreError;
        match e {
            CoreError::AlreadyRunning | CoreError::NotRunning => Error::InvalidState(e.to_string()),
            CoreError::OutOfMemory { capacity } => Error::OutOfMemory { capacity },
            CoreError::TypeMismatch { expected, actual } => Error::WrongType { expected, actual },
            CoreError::InvalidHandle { handle } => Error::InvalidHandle(handle.to_string()),
            CoreError::StaleHandle { handle } => {
                Error::InvalidHandle(format!("{} (released)", handle))
            }
            CoreError::DoubleFree { .. } | CoreError::UnderflowRelease { .. } => {
                Error::Ownership(e.to_string())
            }
            CoreError::Config(msg) => Error::Config(msg),
        }
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
