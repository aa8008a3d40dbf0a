//! Handle type
//!
//! A [`Handle`] is the opaque reference foreign callers hold to a cell. It is
//! a slot index plus the generation the slot had when the cell was
//! allocated. Slots never move, so the index stays valid for the whole life
//! of the cell; the generation lets the arena reject a handle whose slot has
//! since been handed to another value.
//!
//! Generations never wrap. A slot whose generation reaches `u32::MAX` is
//! retired once freed, so no two cells ever share an index and generation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a cell
///
/// `#[repr(C)]` so it can be passed to and returned from C by value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Sentinel that never refers to a cell
    pub const NULL: Handle = Handle {
        index: u32::MAX,
        generation: 0,
    };

    /// Create a handle from its raw parts
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at allocation time
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Check for the null sentinel
    #[inline]
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("#null")
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(Handle::NULL.is_null());
        assert!(Handle::default().is_null());
        assert!(!Handle::new(0, 0).is_null());
        assert_eq!(Handle::NULL.to_string(), "#null");
    }

    #[test]
    fn test_display() {
        assert_eq!(Handle::new(3, 7).to_string(), "#3v7");
    }

    #[test]
    fn test_parts() {
        let h = Handle::new(12, 4);
        assert_eq!(h.index(), 12);
        assert_eq!(h.generation(), 4);
        assert_ne!(h, Handle::new(12, 5));
    }
}
