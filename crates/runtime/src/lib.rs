//! Runtime layer for renc
//!
//! This crate ties the heap to a lifecycle and exposes the boxing API:
//! - [`Runtime`]: startup/shutdown state machine, box/unbox, retain/release
//! - [`Value`]: owned reference that releases on drop
//! - [`Engine`]: process-exclusive runtime that shuts down on drop
//! - [`ShutdownReport`]: exit code, leaks and arena counters from `shutdown`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod lifecycle;
pub mod runtime;
pub mod value;

pub use engine::Engine;
pub use lifecycle::{Leak, LifecycleState, ShutdownReport};
pub use runtime::{LocalRuntime, Runtime, RuntimeBuilder};
pub use value::Value;

pub use renc_heap::{ArenaStats, CellStore, LocalStore, Released, SharedStore};
