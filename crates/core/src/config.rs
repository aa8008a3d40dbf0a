//! Runtime configuration
//!
//! [`RuntimeConfig`] controls how the arena is sized and which threading
//! mode the cell store uses. It is plain data, serializable with serde, so
//! embedders can keep it next to the rest of their settings:
//!
//! ```
//! use renc_core::{RuntimeConfig, ThreadingMode};
//!
//! let config = RuntimeConfig::new()
//!     .initial_capacity(64)
//!     .max_capacity(Some(256))
//!     .threading(ThreadingMode::SingleThreaded);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of slots reserved at startup
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Largest slot count a handle index can address
///
/// `u32::MAX` itself is the null handle index.
pub const MAX_ADDRESSABLE_SLOTS: usize = u32::MAX as usize;

/// Whether the cell store guards the arena for cross-thread use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadingMode {
    /// Arena behind a `RefCell`; the runtime cannot be shared across threads
    SingleThreaded,
    /// Arena behind a mutex; allocate/free and refcount updates are serialized
    #[default]
    ThreadSafe,
}

/// Options for starting a runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Slots reserved when the arena is created
    pub initial_capacity: usize,
    /// Hard bound on the slot count; `None` grows until addressing runs out
    pub max_capacity: Option<usize>,
    /// Threading mode of the cell store
    pub threading: ThreadingMode,
}

impl RuntimeConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of slots reserved at startup
    pub fn initial_capacity(mut self, slots: usize) -> Self {
        self.initial_capacity = slots;
        self
    }

    /// Set (or clear) the hard slot bound
    pub fn max_capacity(mut self, slots: Option<usize>) -> Self {
        self.max_capacity = slots;
        self
    }

    /// Set the threading mode
    pub fn threading(mut self, mode: ThreadingMode) -> Self {
        self.threading = mode;
        self
    }

    /// The slot bound actually enforced by the arena
    pub fn effective_max_capacity(&self) -> usize {
        self.max_capacity.unwrap_or(MAX_ADDRESSABLE_SLOTS)
    }

    /// Check the configuration for contradictions
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_capacity {
            if max == 0 {
                return Err(Error::Config("max_capacity must be at least 1".into()));
            }
            if max > MAX_ADDRESSABLE_SLOTS {
                return Err(Error::Config(format!(
                    "max_capacity {} exceeds addressable limit {}",
                    max, MAX_ADDRESSABLE_SLOTS
                )));
            }
            if self.initial_capacity > max {
                return Err(Error::Config(format!(
                    "initial_capacity {} exceeds max_capacity {}",
                    self.initial_capacity, max
                )));
            }
        } else if self.initial_capacity > MAX_ADDRESSABLE_SLOTS {
            return Err(Error::Config(format!(
                "initial_capacity {} exceeds addressable limit {}",
                self.initial_capacity, MAX_ADDRESSABLE_SLOTS
            )));
        }
        Ok(())
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: None,
            threading: ThreadingMode::default(),
        }
    }
}
