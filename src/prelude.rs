//! Convenient imports for renc.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use renc::prelude::*;
//!
//! let rt = Runtime::builder().start()?;
//! let one = rt.integer(1)?;
//! assert_eq!(one.unbox_integer()?, 1);
//! # Ok::<(), renc::Error>(())
//! ```

// Main entry point
pub use crate::{Engine, Runtime, RuntimeBuilder, Value};

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::{CellKind, Handle, Payload, RuntimeConfig, ThreadingMode};

// Shutdown and refcount results
pub use crate::{Leak, Released, ShutdownReport};
