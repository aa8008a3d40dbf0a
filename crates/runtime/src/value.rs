//! Owned values
//!
//! A [`Value`] owns exactly one reference to a cell and releases it when
//! dropped, so Rust code never has to pair retain/release by hand. The raw
//! [`Handle`] API stays available for foreign callers, and
//! [`Value::into_raw`] / [`Runtime::adopt`] move a reference across that
//! boundary.
//!
//! A `Value` borrows its runtime, so the runtime cannot be shut down while
//! any `Value` is alive.

use crate::runtime::Runtime;
use renc_core::{CellKind, Handle, Result};
use renc_heap::{CellStore, SharedStore};
use std::fmt;
use tracing::error;

/// One owned reference to a boxed cell
pub struct Value<'rt, S: CellStore = SharedStore> {
    runtime: &'rt Runtime<S>,
    handle: Handle,
}

impl<'rt, S: CellStore> Value<'rt, S> {
    pub(crate) fn from_parts(runtime: &'rt Runtime<S>, handle: Handle) -> Self {
        Self { runtime, handle }
    }

    /// The underlying handle (ownership stays with this value)
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Kind of the cell
    pub fn kind(&self) -> Result<CellKind> {
        self.runtime.kind_of(self.handle)
    }

    /// Current reference count of the cell
    pub fn refcount(&self) -> Result<u32> {
        self.runtime.refcount(self.handle)
    }

    /// Read an integer
    pub fn unbox_integer(&self) -> Result<i64> {
        self.runtime.unbox_integer(self.handle)
    }

    /// Read a logic value
    pub fn unbox_logic(&self) -> Result<bool> {
        self.runtime.unbox_logic(self.handle)
    }

    /// Read a decimal
    pub fn unbox_decimal(&self) -> Result<f64> {
        self.runtime.unbox_decimal(self.handle)
    }

    /// Read a character
    pub fn unbox_char(&self) -> Result<char> {
        self.runtime.unbox_char(self.handle)
    }

    /// Retain the cell and return a second owner
    pub fn try_clone(&self) -> Result<Self> {
        self.runtime.retain(self.handle)?;
        Ok(Self::from_parts(self.runtime, self.handle))
    }

    /// Give up ownership without releasing
    ///
    /// The caller becomes responsible for exactly one `release` of the
    /// returned handle.
    pub fn into_raw(self) -> Handle {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }
}

impl<S: CellStore> Drop for Value<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.runtime.release(self.handle) {
            error!(handle = %self.handle, error = %e, "failed to release owned value");
        }
    }
}

impl<S: CellStore> fmt::Debug for Value<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("handle", &self.handle)
            .field("kind", &self.kind().ok())
            .finish()
    }
}
