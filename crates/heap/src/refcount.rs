//! Reference-count manager
//!
//! Retain and release are the only operations that change a cell's count.
//! A release that takes the count to zero hands the slot back to the arena.
//!
//! ## Guards
//!
//! Releasing a cell whose count is already zero fails with
//! [`Error::UnderflowRelease`] before the arena is touched, so an
//! over-release can never push a slot onto the free list twice.

use crate::arena::Arena;
use renc_core::{Error, Handle, Result};
use tracing::{error, trace};

/// Outcome of a successful release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// Other owners remain; carries the new count
    Retained(u32),
    /// The count reached zero and the slot went back to the arena
    Freed,
}

impl Released {
    /// Whether this release freed the cell
    pub fn is_freed(&self) -> bool {
        matches!(self, Released::Freed)
    }
}

/// Increment a cell's reference count, returning the new count
///
/// No upper bound is enforced.
pub fn retain(arena: &mut Arena, handle: Handle) -> Result<u32> {
    match arena.resolve_mut(handle)? {
        Some(cell) => {
            let count = cell.increment();
            trace!(%handle, count, "retain");
            Ok(count)
        }
        // Retaining a freed cell would resurrect it.
        None => Err(Error::StaleHandle { handle }),
    }
}

/// Decrement a cell's reference count, freeing it at zero
pub fn release(arena: &mut Arena, handle: Handle) -> Result<Released> {
    let remaining = match arena.resolve_mut(handle)? {
        Some(cell) => cell.decrement(),
        None => None,
    };
    match remaining {
        None => {
            error!(%handle, "release of a cell with no owners");
            Err(Error::UnderflowRelease { handle })
        }
        Some(0) => {
            arena.free(handle)?;
            trace!(%handle, "release freed cell");
            Ok(Released::Freed)
        }
        Some(count) => {
            trace!(%handle, count, "release");
            Ok(Released::Retained(count))
        }
    }
}

/// Current reference count of a live cell
pub fn refcount(arena: &Arena, handle: Handle) -> Result<u32> {
    arena.get(handle).map(|cell| cell.refcount())
}
