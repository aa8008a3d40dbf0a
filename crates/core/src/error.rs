//! Error types for renc
//!
//! Every fallible runtime operation returns [`Result`]. Nothing is retried
//! and nothing is swallowed: each variant reaches the caller.
//!
//! ## Error Codes (Canonical)
//!
//! | Code | Description |
//! |------|-------------|
//! | AlreadyRunning | startup called on a running runtime |
//! | NotRunning | operation on a runtime that is not running |
//! | OutOfMemory | arena reached its hard capacity or could not reserve slots |
//! | DoubleFree | slot freed while already free |
//! | UnderflowRelease | release on a cell whose count is already zero |
//! | TypeMismatch | checked accessor on a cell of another kind |
//! | InvalidHandle | handle index never handed out by this arena |
//! | StaleHandle | handle outlived its cell |
//! | Config | invalid runtime configuration |

use crate::cell::CellKind;
use crate::handle::Handle;
use thiserror::Error;

/// All runtime errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// `startup` on a runtime that is already running
    #[error("runtime is already running")]
    AlreadyRunning,

    /// Operation on a runtime that has not been started or was shut down
    #[error("runtime is not running")]
    NotRunning,

    /// The arena reached its configured hard capacity or the allocator refused to grow it
    #[error("out of memory: arena capacity of {capacity} cells exhausted")]
    OutOfMemory {
        /// Configured maximum number of slots
        capacity: usize,
    },

    /// A slot was freed while already on the free list
    #[error("double free of slot {index}")]
    DoubleFree {
        /// Slot index
        index: u32,
    },

    /// `release` on a cell whose reference count is already zero
    #[error("release underflow on {handle}")]
    UnderflowRelease {
        /// The over-released handle
        handle: Handle,
    },

    /// Checked accessor on a cell of a different kind
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Kind the accessor reads
        expected: CellKind,
        /// Kind the cell holds
        actual: CellKind,
    },

    /// Handle index outside anything the arena ever handed out
    #[error("invalid handle {handle}")]
    InvalidHandle {
        /// The rejected handle
        handle: Handle,
    },

    /// Handle whose cell was released (and possibly replaced)
    #[error("stale handle {handle}")]
    StaleHandle {
        /// The rejected handle
        handle: Handle,
    },

    /// Invalid runtime configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the canonical error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::AlreadyRunning => "AlreadyRunning",
            Error::NotRunning => "NotRunning",
            Error::OutOfMemory { .. } => "OutOfMemory",
            Error::DoubleFree { .. } => "DoubleFree",
            Error::UnderflowRelease { .. } => "UnderflowRelease",
            Error::TypeMismatch { .. } => "TypeMismatch",
            Error::InvalidHandle { .. } => "InvalidHandle",
            Error::StaleHandle { .. } => "StaleHandle",
            Error::Config(_) => "Config",
        }
    }

    /// Check if this error signals a bug in the caller
    ///
    /// Double frees, over-releases, dead handles and reads of the wrong kind
    /// are never expected on a correct program path.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Error::DoubleFree { .. }
                | Error::UnderflowRelease { .. }
                | Error::TypeMismatch { .. }
                | Error::InvalidHandle { .. }
                | Error::StaleHandle { .. }
        )
    }

    /// Check if this is a lifecycle error
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Error::AlreadyRunning | Error::NotRunning)
    }
}
