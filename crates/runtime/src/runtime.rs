//! The runtime object
//!
//! [`Runtime`] owns the lifecycle state and, while running, the cell store.
//! It is passed to (or borrowed by) everything that boxes values; the core
//! keeps no hidden global.
//!
//! # Example
//!
//! ```
//! use renc_runtime::Runtime;
//!
//! let mut rt = Runtime::builder().initial_capacity(16).start()?;
//!
//! let h = rt.box_integer(1)?;
//! assert_eq!(rt.unbox_integer(h)?, 1);
//! rt.release(h)?;
//!
//! let report = rt.shutdown(0)?;
//! assert!(report.is_clean());
//! assert_eq!(report.exit_code, 0);
//! # Ok::<(), renc_core::Error>(())
//! ```
//!
//! # Threading
//!
//! The store type picks the threading mode. `Runtime<SharedStore>` (the
//! default) is `Send + Sync`; `Runtime<LocalStore>` is `!Sync`. `startup` and
//! `shutdown` take `&mut self`, so they can never race a boxing call made
//! through a shared reference.

use crate::engine::Engine;
use crate::lifecycle::{LifecycleState, Leak, ShutdownReport};
use crate::value::Value;
use renc_core::{CellKind, Error, Handle, Payload, Result, RuntimeConfig, ThreadingMode};
use renc_heap::{refcount, Arena, ArenaStats, CellStore, LocalStore, Released, SharedStore};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Single-threaded runtime
pub type LocalRuntime = Runtime<LocalStore>;

/// Boxed-value runtime with manual reference counting
pub struct Runtime<S: CellStore = SharedStore> {
    config: RuntimeConfig,
    state: LifecycleState,
    store: Option<S>,
    ticks: AtomicU64,
}

impl Runtime<SharedStore> {
    /// Create a builder for runtime configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use renc_runtime::Runtime;
    ///
    /// let rt = Runtime::builder()
    ///     .initial_capacity(8)
    ///     .max_capacity(64)
    ///     .build()?;
    /// assert!(!rt.is_running());
    /// # Ok::<(), renc_core::Error>(())
    /// ```
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }
}

impl<S: CellStore> Runtime<S> {
    /// Create an uninitialized runtime
    ///
    /// Fails with [`Error::Config`] if the configuration is invalid or names
    /// a threading mode other than the one `S` implements.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        if config.threading != S::MODE {
            return Err(Error::Config(format!(
                "configured {:?} but the store is {:?}",
                config.threading,
                S::MODE
            )));
        }
        Ok(Self {
            config,
            state: LifecycleState::Uninitialized,
            store: None,
            ticks: AtomicU64::new(0),
        })
    }

    /// The configuration this runtime was created with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Check if the runtime accepts boxing calls
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Threading mode of the store
    pub fn threading(&self) -> ThreadingMode {
        S::MODE
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Allocate the arena and start accepting calls
    ///
    /// Fails with [`Error::AlreadyRunning`] if called twice without an
    /// intervening `shutdown`, and with [`Error::OutOfMemory`] if the initial
    /// slots cannot be reserved. A failed startup leaves the runtime
    /// uninitialized.
    pub fn startup(&mut self) -> Result<()> {
        if self.state != LifecycleState::Uninitialized {
            warn!(state = %self.state, "startup on a live runtime");
            return Err(Error::AlreadyRunning);
        }
        let arena = Arena::from_config(&self.config)?;
        self.store = Some(S::new(arena));
        *self.ticks.get_mut() = 0;
        self.state = LifecycleState::Running;
        info!(
            initial_capacity = self.config.initial_capacity,
            max_capacity = self.config.effective_max_capacity(),
            threading = ?S::MODE,
            "runtime started"
        );
        Ok(())
    }

    /// Scan for leaks, drop the arena and return to `Uninitialized`
    ///
    /// Every cell still in use becomes a [`Leak`] in the report and a warning
    /// in the log. `exit_code` is handed back unchanged. Fails with
    /// [`Error::NotRunning`] if the runtime is not running.
    pub fn shutdown(&mut self, exit_code: i32) -> Result<ShutdownReport> {
        if !self.is_running() {
            return Err(Error::NotRunning);
        }
        self.state = LifecycleState::ShuttingDown;

        let arena = match self.store.take() {
            Some(store) => store.into_inner(),
            None => {
                self.state = LifecycleState::Uninitialized;
                return Err(Error::NotRunning);
            }
        };

        let leaks: Vec<Leak> = arena
            .leaks()
            .map(|(handle, cell)| Leak {
                handle,
                kind: cell.kind(),
                refcount: cell.refcount(),
            })
            .collect();
        for leak in &leaks {
            warn!(handle = %leak.handle, kind = %leak.kind, refcount = leak.refcount, "leaked cell");
        }

        let stats = arena.stats();
        drop(arena);

        let report = ShutdownReport {
            exit_code,
            leaks,
            stats,
            ticks: *self.ticks.get_mut(),
        };
        self.state = LifecycleState::Uninitialized;
        info!(
            exit_code,
            leaks = report.leaks.len(),
            high_water = report.stats.high_water,
            "runtime shut down"
        );
        Ok(report)
    }

    /// Arena counters
    pub fn stats(&self) -> Result<ArenaStats> {
        self.store().map(|store| store.with(|arena| arena.stats()))
    }

    /// API operations served since startup
    pub fn tick(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Boxing
    // ========================================================================

    /// Box an arbitrary payload; the new cell has a reference count of 1
    pub fn box_payload(&self, payload: Payload) -> Result<Handle> {
        self.with_arena(|arena| arena.allocate(payload))
    }

    /// Box a 64-bit signed integer
    ///
    /// Fails only with [`Error::OutOfMemory`] (or [`Error::NotRunning`]).
    pub fn box_integer(&self, value: i64) -> Result<Handle> {
        self.box_payload(Payload::Integer(value))
    }

    /// Box a logic value
    pub fn box_logic(&self, value: bool) -> Result<Handle> {
        self.box_payload(Payload::Logic(value))
    }

    /// Box a decimal value
    pub fn box_decimal(&self, value: f64) -> Result<Handle> {
        self.box_payload(Payload::Decimal(value))
    }

    /// Box a character
    pub fn box_char(&self, value: char) -> Result<Handle> {
        self.box_payload(Payload::Char(value))
    }

    /// Box the void value
    pub fn box_void(&self) -> Result<Handle> {
        self.box_payload(Payload::Void)
    }

    /// Box the blank value
    pub fn box_blank(&self) -> Result<Handle> {
        self.box_payload(Payload::Blank)
    }

    // ========================================================================
    // Unboxing
    // ========================================================================

    /// Read an integer, failing with [`Error::TypeMismatch`] on other kinds
    pub fn unbox_integer(&self, handle: Handle) -> Result<i64> {
        self.with_cell(handle, |cell| cell.integer())
    }

    /// Read an integer without checking the kind
    ///
    /// # Safety
    ///
    /// The runtime must be running and `handle` must refer to a live
    /// `Integer` cell. Debug builds assert all three; in release builds a
    /// violation is undefined behavior.
    pub unsafe fn unbox_integer_unchecked(&self, handle: Handle) -> i64 {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        debug_assert!(self.is_running(), "unchecked unbox on a stopped runtime");
        let store = match self.store.as_ref() {
            Some(store) => store,
            // SAFETY: the caller guarantees the runtime is running.
            None => unsafe { std::hint::unreachable_unchecked() },
        };
        store.with(|arena| {
            let cell = arena.get(handle);
            debug_assert!(cell.is_ok(), "unchecked unbox on dead handle {}", handle);
            match cell {
                // SAFETY: the caller guarantees the cell holds an integer.
                Ok(cell) => unsafe { cell.integer_unchecked() },
                // SAFETY: the caller guarantees the handle is live.
                Err(_) => unsafe { std::hint::unreachable_unchecked() },
            }
        })
    }

    /// Read a logic value
    pub fn unbox_logic(&self, handle: Handle) -> Result<bool> {
        self.with_cell(handle, |cell| cell.logic())
    }

    /// Read a decimal value
    pub fn unbox_decimal(&self, handle: Handle) -> Result<f64> {
        self.with_cell(handle, |cell| cell.decimal())
    }

    /// Read a character
    pub fn unbox_char(&self, handle: Handle) -> Result<char> {
        self.with_cell(handle, |cell| cell.char())
    }

    /// Kind of the cell behind `handle`
    pub fn kind_of(&self, handle: Handle) -> Result<CellKind> {
        self.with_cell(handle, |cell| Ok(cell.kind()))
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Add an owner to the cell behind `handle`
    pub fn retain(&self, handle: Handle) -> Result<()> {
        self.with_arena(|arena| refcount::retain(arena, handle))
            .map(|_| ())
    }

    /// Drop an owner, freeing the cell when the count reaches zero
    ///
    /// Fails with [`Error::UnderflowRelease`] if the count is already zero.
    pub fn release(&self, handle: Handle) -> Result<Released> {
        self.with_arena(|arena| refcount::release(arena, handle))
    }

    /// Current reference count of the cell behind `handle`
    pub fn refcount(&self, handle: Handle) -> Result<u32> {
        self.with_cell(handle, |cell| Ok(cell.refcount()))
    }

    // ========================================================================
    // Owned values
    // ========================================================================

    /// Box an integer as an owned [`Value`]
    pub fn integer(&self, value: i64) -> Result<Value<'_, S>> {
        self.owned(Payload::Integer(value))
    }

    /// Box a logic value as an owned [`Value`]
    pub fn logic(&self, value: bool) -> Result<Value<'_, S>> {
        self.owned(Payload::Logic(value))
    }

    /// Box a decimal as an owned [`Value`]
    pub fn decimal(&self, value: f64) -> Result<Value<'_, S>> {
        self.owned(Payload::Decimal(value))
    }

    /// Box a character as an owned [`Value`]
    pub fn char(&self, value: char) -> Result<Value<'_, S>> {
        self.owned(Payload::Char(value))
    }

    /// Box void as an owned [`Value`]
    pub fn void(&self) -> Result<Value<'_, S>> {
        self.owned(Payload::Void)
    }

    /// Box blank as an owned [`Value`]
    pub fn blank(&self) -> Result<Value<'_, S>> {
        self.owned(Payload::Blank)
    }

    /// Take over one reference held as a raw handle
    ///
    /// The returned [`Value`] releases that reference when dropped. Use it to
    /// wrap handles that come back from foreign code.
    pub fn adopt(&self, handle: Handle) -> Result<Value<'_, S>> {
        self.with_cell(handle, |_| Ok(()))?;
        Ok(Value::from_parts(self, handle))
    }

    fn owned(&self, payload: Payload) -> Result<Value<'_, S>> {
        let handle = self.box_payload(payload)?;
        Ok(Value::from_parts(self, handle))
    }

    // ========================================================================
    // Store access
    // ========================================================================

    fn store(&self) -> Result<&S> {
        match (&self.store, self.state) {
            (Some(store), LifecycleState::Running) => Ok(store),
            _ => Err(Error::NotRunning),
        }
    }

    fn with_arena<R>(&self, f: impl FnOnce(&mut Arena) -> Result<R>) -> Result<R> {
        let store = self.store()?;
        self.ticks.fetch_add(1, Ordering::Relaxed);
        store.with_mut(f)
    }

    fn with_cell<R>(
        &self,
        handle: Handle,
        f: impl FnOnce(&renc_core::Cell) -> Result<R>,
    ) -> Result<R> {
        let store = self.store()?;
        self.ticks.fetch_add(1, Ordering::Relaxed);
        store.with(|arena| f(arena.get(handle)?))
    }
}

impl<S: CellStore> Drop for Runtime<S> {
    fn drop(&mut self) {
        if self.is_running() {
            debug!("runtime dropped while running, shutting down");
            if let Err(e) = self.shutdown(0) {
                warn!(error = %e, "shutdown on drop failed");
            }
        }
    }
}

impl<S: CellStore> std::fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.state)
            .field("threading", &S::MODE)
            .field("config", &self.config)
            .field("ticks", &self.tick())
            .finish()
    }
}

/// Builder for runtime configuration.
///
/// # Example
///
/// ```
/// use renc_runtime::Runtime;
///
/// // Bounded, thread-safe (default)
/// let rt = Runtime::builder().max_capacity(1024).start()?;
/// assert!(rt.is_running());
///
/// // Single-threaded
/// let local = Runtime::builder().single_threaded().start_local()?;
/// assert!(local.is_running());
/// # Ok::<(), renc_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Slots reserved at startup
    pub fn initial_capacity(mut self, slots: usize) -> Self {
        self.config.initial_capacity = slots;
        self
    }

    /// Hard slot bound; allocation past it fails with `OutOfMemory`
    pub fn max_capacity(mut self, slots: usize) -> Self {
        self.config.max_capacity = Some(slots);
        self
    }

    /// Remove the hard slot bound
    pub fn unbounded(mut self) -> Self {
        self.config.max_capacity = None;
        self
    }

    /// Use the single-threaded store
    pub fn single_threaded(mut self) -> Self {
        self.config.threading = ThreadingMode::SingleThreaded;
        self
    }

    /// Use the thread-safe store
    pub fn thread_safe(mut self) -> Self {
        self.config.threading = ThreadingMode::ThreadSafe;
        self
    }

    /// Build an uninitialized thread-safe runtime
    pub fn build(self) -> Result<Runtime<SharedStore>> {
        Runtime::new(self.config)
    }

    /// Build an uninitialized single-threaded runtime
    pub fn build_local(self) -> Result<Runtime<LocalStore>> {
        Runtime::new(self.config)
    }

    /// Build and start a thread-safe runtime
    pub fn start(self) -> Result<Runtime<SharedStore>> {
        let mut rt = self.build()?;
        rt.startup()?;
        Ok(rt)
    }

    /// Build and start a single-threaded runtime
    pub fn start_local(self) -> Result<Runtime<LocalStore>> {
        let mut rt = self.build_local()?;
        rt.startup()?;
        Ok(rt)
    }

    /// Claim the process-wide [`Engine`] with this configuration
    pub fn engine(self) -> Result<Engine> {
        Engine::with_config(self.config)
    }
}
