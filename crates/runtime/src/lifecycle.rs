//! Runtime lifecycle types
//!
//! ## State Machine
//!
//! ```text
//! Uninitialized --startup()--> Running --shutdown()--> ShuttingDown --> Uninitialized
//! ```
//!
//! `ShuttingDown` only exists while `shutdown` walks the arena for leaks.
//! A runtime can be started again after it returns to `Uninitialized`.

use renc_core::{CellKind, Handle};
use renc_heap::ArenaStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    /// No arena; only `startup` is accepted
    #[default]
    Uninitialized,
    /// Arena allocated; all operations accepted
    Running,
    /// Leak scan in progress
    ShuttingDown,
}

impl LifecycleState {
    /// Check if the runtime accepts boxing calls
    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting down",
        };
        f.write_str(name)
    }
}

/// A cell still in use at shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leak {
    /// Handle of the leaked cell
    pub handle: Handle,
    /// Kind of the leaked cell
    pub kind: CellKind,
    /// Reference count at shutdown
    pub refcount: u32,
}

impl fmt::Display for Leak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cell {} (refcount {})",
            self.kind, self.handle, self.refcount
        )
    }
}

/// What `shutdown` found
///
/// Leaks are collected, not fatal. The exit code is whatever the embedder
/// passed to `shutdown`, handed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownReport {
    /// Exit code passed to `shutdown`
    pub exit_code: i32,
    /// Cells still in use, in slot order
    pub leaks: Vec<Leak>,
    /// Arena counters at the moment of shutdown
    pub stats: ArenaStats,
    /// API operations served since startup
    pub ticks: u64,
}

impl ShutdownReport {
    /// Check that every cell was released
    pub fn is_clean(&self) -> bool {
        self.leaks.is_empty()
    }

    /// Find the leak entry for `handle`
    pub fn leak_for(&self, handle: Handle) -> Option<&Leak> {
        self.leaks.iter().find(|leak| leak.handle == handle)
    }
}
