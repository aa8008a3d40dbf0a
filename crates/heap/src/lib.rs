//! Heap layer for renc
//!
//! This crate implements cell storage with:
//! - Arena: slab allocator with a free list and generation-checked handles
//! - refcount: retain/release, freeing slots at zero
//! - LocalStore / SharedStore: single-threaded and thread-safe arena owners

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod refcount;
pub mod store;

pub use arena::{Arena, ArenaStats};
pub use refcount::Released;
pub use store::{CellStore, LocalStore, SharedStore};
