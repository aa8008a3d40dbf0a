//! `extern "C"` entry points
//!
//! One process-wide [`Engine`] sits behind a `RwLock<Option<_>>`:
//! `renc_startup` and `renc_shutdown` take the write lock, every other call
//! takes the read lock and then goes through the runtime's own store lock.
//! A call made while no engine is installed fails with `NotRunning`.
//!
//! # Safety
//!
//! Every out-pointer must be null or valid for a write of its type. A null
//! out-pointer is rejected with `InvalidArgument` before the runtime is
//! touched, so no cell is allocated for a result that cannot be returned.

#![allow(clippy::missing_safety_doc)]

use crate::error::RencErrorCode;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use renc_core::{Error, Handle, Result, RuntimeConfig};
use renc_runtime::Engine;
use std::os::raw::c_char;
use tracing::debug;

static ENGINE: Lazy<RwLock<Option<Engine>>> = Lazy::new(|| RwLock::new(None));

/// Summary handed back by [`renc_shutdown`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RencShutdownReport {
    /// Exit code passed to `renc_shutdown`
    pub exit_code: i32,
    /// Cells still in use at shutdown
    pub leak_count: u64,
}

// ============================================================================
// Helpers
// ============================================================================

fn with_engine<T>(f: impl FnOnce(&Engine) -> Result<T>) -> Result<T> {
    let guard = ENGINE.read();
    let engine = guard.as_ref().ok_or(Error::NotRunning)?;
    f(engine)
}

/// Run `f` and write its value through `out`
unsafe fn write_out<T>(out: *mut T, f: impl FnOnce(&Engine) -> Result<T>) -> RencErrorCode {
    if out.is_null() {
        return RencErrorCode::InvalidArgument;
    }
    match with_engine(f) {
        Ok(value) => {
            out.write(value);
            RencErrorCode::Ok
        }
        Err(e) => e.into(),
    }
}

fn status(result: Result<()>) -> RencErrorCode {
    RencErrorCode::from(&result)
}

fn start(config: RuntimeConfig) -> RencErrorCode {
    let mut slot = ENGINE.write();
    if slot.is_some() {
        return RencErrorCode::AlreadyRunning;
    }
    match Engine::with_config(config) {
        Ok(engine) => {
            *slot = Some(engine);
            RencErrorCode::Ok
        }
        Err(e) => e.into(),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Start the process-wide runtime with the default configuration
#[no_mangle]
pub extern "C" fn renc_startup() -> RencErrorCode {
    start(RuntimeConfig::default())
}

/// Start the process-wide runtime with explicit sizing
///
/// `max_capacity == 0` means unbounded.
#[no_mangle]
pub extern "C" fn renc_startup_with_capacity(
    initial_capacity: usize,
    max_capacity: usize,
) -> RencErrorCode {
    let max = (max_capacity != 0).then_some(max_capacity);
    start(
        RuntimeConfig::new()
            .initial_capacity(initial_capacity)
            .max_capacity(max),
    )
}

/// Shut the runtime down, reporting leaks
///
/// `out_report` may be null when the caller does not want the report.
#[no_mangle]
pub unsafe extern "C" fn renc_shutdown(
    exit_code: i32,
    out_report: *mut RencShutdownReport,
) -> RencErrorCode {
    let engine = match ENGINE.write().take() {
        Some(engine) => engine,
        None => return RencErrorCode::NotRunning,
    };
    match engine.shutdown(exit_code) {
        Ok(report) => {
            debug!(exit_code, leaks = report.leaks.len(), "foreign shutdown");
            if !out_report.is_null() {
                out_report.write(RencShutdownReport {
                    exit_code: report.exit_code,
                    leak_count: report.leaks.len() as u64,
                });
            }
            RencErrorCode::Ok
        }
        Err(e) => e.into(),
    }
}

/// API operations served since startup, or 0 when not running
#[no_mangle]
pub extern "C" fn renc_tick() -> u64 {
    with_engine(|engine| Ok(engine.tick())).unwrap_or(0)
}

// ============================================================================
// Boxing
// ============================================================================

/// Box a 64-bit integer
#[no_mangle]
pub unsafe extern "C" fn renc_box_integer(value: i64, out_handle: *mut Handle) -> RencErrorCode {
    write_out(out_handle, |engine| engine.box_integer(value))
}

/// Box a logic value
#[no_mangle]
pub unsafe extern "C" fn renc_box_logic(value: bool, out_handle: *mut Handle) -> RencErrorCode {
    write_out(out_handle, |engine| engine.box_logic(value))
}

/// Box a decimal value
#[no_mangle]
pub unsafe extern "C" fn renc_box_decimal(value: f64, out_handle: *mut Handle) -> RencErrorCode {
    write_out(out_handle, |engine| engine.box_decimal(value))
}

/// Box a Unicode scalar value
///
/// Surrogates and values above `0x10FFFF` give `InvalidArgument`.
#[no_mangle]
pub unsafe extern "C" fn renc_box_char(codepoint: u32, out_handle: *mut Handle) -> RencErrorCode {
    let value = match char::from_u32(codepoint) {
        Some(c) => c,
        None => return RencErrorCode::InvalidArgument,
    };
    write_out(out_handle, |engine| engine.box_char(value))
}

/// Box the void value
#[no_mangle]
pub unsafe extern "C" fn renc_box_void(out_handle: *mut Handle) -> RencErrorCode {
    write_out(out_handle, |engine| engine.box_void())
}

/// Box the blank value
#[no_mangle]
pub unsafe extern "C" fn renc_box_blank(out_handle: *mut Handle) -> RencErrorCode {
    write_out(out_handle, |engine| engine.box_blank())
}

// ============================================================================
// Unboxing
// ============================================================================

/// Read an integer; `TypeMismatch` on other kinds
#[no_mangle]
pub unsafe extern "C" fn renc_unbox_integer(handle: Handle, out_value: *mut i64) -> RencErrorCode {
    write_out(out_value, |engine| engine.unbox_integer(handle))
}

/// Read an integer without any check
///
/// # Safety
///
/// The runtime must be running and `handle` must refer to a live integer
/// cell. Anything else is undefined behavior in release builds.
#[no_mangle]
pub unsafe extern "C" fn renc_unbox_integer_unchecked(handle: Handle) -> i64 {
    let guard = ENGINE.read();
    debug_assert!(guard.is_some(), "unchecked unbox with no runtime");
    match guard.as_ref() {
        Some(engine) => engine.unbox_integer_unchecked(handle),
        None => std::hint::unreachable_unchecked(),
    }
}

/// Read a logic value
#[no_mangle]
pub unsafe extern "C" fn renc_unbox_logic(handle: Handle, out_value: *mut bool) -> RencErrorCode {
    write_out(out_value, |engine| engine.unbox_logic(handle))
}

/// Read a decimal value
#[no_mangle]
pub unsafe extern "C" fn renc_unbox_decimal(handle: Handle, out_value: *mut f64) -> RencErrorCode {
    write_out(out_value, |engine| engine.unbox_decimal(handle))
}

/// Read a character as its Unicode scalar value
#[no_mangle]
pub unsafe extern "C" fn renc_unbox_char(handle: Handle, out_value: *mut u32) -> RencErrorCode {
    write_out(out_value, |engine| engine.unbox_char(handle).map(u32::from))
}

/// Read the kind tag (`0` void through `5` char)
#[no_mangle]
pub unsafe extern "C" fn renc_kind_of(handle: Handle, out_kind: *mut u8) -> RencErrorCode {
    write_out(out_kind, |engine| engine.kind_of(handle).map(|k| k as u8))
}

// ============================================================================
// Reference counting
// ============================================================================

/// Add an owner
#[no_mangle]
pub extern "C" fn renc_retain(handle: Handle) -> RencErrorCode {
    status(with_engine(|engine| engine.retain(handle)))
}

/// Drop an owner; the cell is freed when none remain
#[no_mangle]
pub extern "C" fn renc_release(handle: Handle) -> RencErrorCode {
    status(with_engine(|engine| engine.release(handle).map(|_| ())))
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Static description of a result code
///
/// The returned string is NUL-terminated, never freed and valid for the
/// life of the process.
#[no_mangle]
pub extern "C" fn renc_error_message(code: i32) -> *const c_char {
    match RencErrorCode::from_raw(code) {
        Some(code) => code.message_ptr(),
        None => b"unknown error code\0".as_ptr().cast(),
    }
}

/// Install a stderr log subscriber filtered by `RENC_LOG`
///
/// Returns `false` when the host process already installed its own global
/// subscriber, in which case renc logs through that one. Safe to call more
/// than once; later calls return the first call's result.
#[no_mangle]
pub extern "C" fn renc_init_logging() -> bool {
    crate::logging::init_logging()
}
