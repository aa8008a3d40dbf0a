//! Cell stores
//!
//! A store owns the [`Arena`] for a running runtime and decides how access
//! to it is synchronized. The threading mode is a type parameter of the
//! runtime rather than a runtime flag, so the compiler rejects sharing a
//! single-threaded runtime across threads.
//!
//! | Store | Guard | Runtime is `Sync` |
//! |-------|-------|-------------------|
//! | [`LocalStore`] | `RefCell` | no |
//! | [`SharedStore`] | `parking_lot::Mutex` | yes |
//!
//! Closures passed to [`CellStore::with`] and [`CellStore::with_mut`] must
//! not call back into the store.

use crate::arena::Arena;
use parking_lot::Mutex;
use renc_core::ThreadingMode;
use std::cell::RefCell;

/// Synchronized ownership of an arena
pub trait CellStore {
    /// Threading mode this store implements
    const MODE: ThreadingMode;

    /// Take ownership of `arena`
    fn new(arena: Arena) -> Self;

    /// Run `f` with shared access to the arena
    fn with<R>(&self, f: impl FnOnce(&Arena) -> R) -> R;

    /// Run `f` with exclusive access to the arena
    fn with_mut<R>(&self, f: impl FnOnce(&mut Arena) -> R) -> R;

    /// Give the arena back
    fn into_inner(self) -> Arena;
}

/// Single-threaded store
#[derive(Debug)]
pub struct LocalStore {
    arena: RefCell<Arena>,
}

impl CellStore for LocalStore {
    const MODE: ThreadingMode = ThreadingMode::SingleThreaded;

    fn new(arena: Arena) -> Self {
        Self {
            arena: RefCell::new(arena),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&Arena) -> R) -> R {
        f(&*self.arena.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut Arena) -> R) -> R {
        f(&mut *self.arena.borrow_mut())
    }

    fn into_inner(self) -> Arena {
        self.arena.into_inner()
    }
}

/// Thread-safe store
///
/// Allocation, free and every refcount update happen under one lock, which
/// keeps the free list and the counts consistent across threads.
#[derive(Debug)]
pub struct SharedStore {
    arena: Mutex<Arena>,
}

impl CellStore for SharedStore {
    const MODE: ThreadingMode = ThreadingMode::ThreadSafe;

    fn new(arena: Arena) -> Self {
        Self {
            arena: Mutex::new(arena),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&Arena) -> R) -> R {
        f(&*self.arena.lock())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut Arena) -> R) -> R {
        f(&mut *self.arena.lock())
    }

    fn into_inner(self) -> Arena {
        self.arena.into_inner()
    }
}
