//! # renc
//!
//! Boxed-value runtime with manual reference counting.
//!
//! renc stores small tagged values (integers, decimals, characters, logic,
//! void and blank) in reference-counted cells inside a slab arena and hands
//! out opaque [`Handle`]s. The caller owns every handle it receives and must
//! release it exactly once; anything still alive at shutdown is reported as
//! a leak.
//!
//! ## Quick Start
//!
//! ```
//! use renc::prelude::*;
//!
//! let mut rt = Runtime::builder().initial_capacity(64).start()?;
//!
//! // Raw handles: pair every box with a release
//! let h = rt.box_integer(1)?;
//! assert_eq!(rt.unbox_integer(h)?, 1);
//! rt.release(h)?;
//!
//! // Owned values release themselves
//! {
//!     let half = rt.decimal(0.5)?;
//!     assert_eq!(half.kind()?, CellKind::Decimal);
//! }
//!
//! let report = rt.shutdown(0)?;
//! assert!(report.is_clean());
//! # Ok::<(), renc::Error>(())
//! ```
//!
//! ## Layers
//!
//! - `renc-core`: [`Cell`], [`Handle`], [`RuntimeConfig`], the error taxonomy
//! - `renc-heap`: the slab [`Arena`], reference counting, threading stores
//! - `renc-runtime`: [`Runtime`] lifecycle, [`Value`], the process-wide [`Engine`]
//! - `renc-ffi`: the C ABI (a separate crate, not re-exported here)

#![warn(missing_docs)]

mod error;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use renc_runtime::{
    Engine, Leak, LifecycleState, LocalRuntime, Runtime, RuntimeBuilder, ShutdownReport, Value,
};

// Re-export heap types
pub use renc_heap::{Arena, ArenaStats, CellStore, LocalStore, Released, SharedStore};

// Re-export core types
pub use renc_core::{
    Cell, CellKind, Handle, Payload, RuntimeConfig, ThreadingMode, DEFAULT_INITIAL_CAPACITY,
    MAX_ADDRESSABLE_SLOTS,
};

/// Parse and validate a [`RuntimeConfig`] from JSON.
///
/// Missing fields take their defaults.
///
/// # Example
///
/// ```
/// use renc::{config_from_json, ThreadingMode};
///
/// let config = config_from_json(r#"{"initial_capacity": 16, "threading": "single_threaded"}"#)?;
/// assert_eq!(config.initial_capacity, 16);
/// assert_eq!(config.threading, ThreadingMode::SingleThreaded);
/// # Ok::<(), renc::Error>(())
/// ```
pub fn config_from_json(json: &str) -> Result<RuntimeConfig> {
    let config = RuntimeConfig::from_json(json)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json_defaults() {
        let config = config_from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_config_from_json_rejects_bad_bounds() {
        let err = config_from_json(r#"{"initial_capacity": 10, "max_capacity": 2}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_from_json_rejects_garbage() {
        let err = config_from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
