//! Process-wide engine guard
//!
//! An embedding process gets at most one [`Engine`] at a time. Creating one
//! starts a thread-safe runtime; dropping it shuts the runtime down and logs
//! any leaks. A second `Engine` while the first is alive fails with
//! [`Error::AlreadyRunning`].
//!
//! The guard derefs to [`Runtime`], so all boxing calls are available on it
//! directly. `startup`/`shutdown` need `&mut Runtime` and are therefore only
//! reachable through [`Engine::shutdown`].

use crate::lifecycle::ShutdownReport;
use crate::runtime::Runtime;
use renc_core::{Error, Result, RuntimeConfig, ThreadingMode};
use renc_heap::SharedStore;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

static ENGINE_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Exclusive, self-shutting-down runtime
#[derive(Debug)]
pub struct Engine {
    runtime: Runtime<SharedStore>,
}

impl Engine {
    /// Claim the engine with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Claim the engine with `config`
    ///
    /// The threading mode is forced to thread-safe.
    pub fn with_config(config: RuntimeConfig) -> Result<Self> {
        let mut runtime = Runtime::new(config.threading(ThreadingMode::ThreadSafe))?;
        if ENGINE_CLAIMED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("engine already running in this process");
            return Err(Error::AlreadyRunning);
        }
        if let Err(e) = runtime.startup() {
            ENGINE_CLAIMED.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(Self { runtime })
    }

    /// Check whether some engine currently holds the process
    pub fn is_claimed() -> bool {
        ENGINE_CLAIMED.load(Ordering::SeqCst)
    }

    /// Shut down with `exit_code` and release the process claim
    pub fn shutdown(mut self, exit_code: i32) -> Result<ShutdownReport> {
        self.runtime.shutdown(exit_code)
        // Drop releases the claim.
    }
}

impl Deref for Engine {
    type Target = Runtime<SharedStore>;

    fn deref(&self) -> &Self::Target {
        &self.runtime
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.runtime.is_running() {
            match self.runtime.shutdown(0) {
                Ok(report) if !report.is_clean() => {
                    warn!(leaks = report.leaks.len(), "engine dropped with live cells")
                }
                Ok(_) => info!("engine dropped"),
                Err(e) => warn!(error = %e, "engine shutdown failed"),
            }
        }
        ENGINE_CLAIMED.store(false, Ordering::SeqCst);
    }
}
