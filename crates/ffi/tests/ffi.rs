//! Foreign Boundary Tests
//!
//! Drives the `renc_*` entry points the way a C host would. All tests share
//! the process-wide runtime, so each one holds `SERIAL` and leaves the
//! runtime shut down.

use parking_lot::Mutex;
use renc_core::{CellKind, Handle};
use renc_ffi::*;
use std::ffi::CStr;
use std::ptr;

static SERIAL: Mutex<()> = parking_lot::const_mutex(());

fn shutdown_quietly() {
    unsafe {
        renc_shutdown(0, ptr::null_mut());
    }
}

// ============================================================================
// Smoke scenario
// ============================================================================

#[test]
fn startup_box_unbox_release_shutdown() {
    let _guard = SERIAL.lock();
    let installed = renc_init_logging();
    // later calls report the outcome of the first
    assert_eq!(renc_init_logging(), installed);

    assert_eq!(renc_startup(), RencErrorCode::Ok);

    let mut h = Handle::NULL;
    let mut v = 0i64;
    unsafe {
        assert_eq!(renc_box_integer(1, &mut h), RencErrorCode::Ok);
        assert_eq!(renc_unbox_integer(h, &mut v), RencErrorCode::Ok);
    }
    assert_eq!(v, 1);
    assert_eq!(unsafe { renc_unbox_integer_unchecked(h) }, 1);
    assert_eq!(renc_release(h), RencErrorCode::Ok);

    let mut report = RencShutdownReport::default();
    assert_eq!(unsafe { renc_shutdown(1, &mut report) }, RencErrorCode::Ok);
    assert_eq!(report.exit_code, 1);
    assert_eq!(report.leak_count, 0);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn double_startup_is_rejected() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup(), RencErrorCode::Ok);
    assert_eq!(renc_startup(), RencErrorCode::AlreadyRunning);
    assert_eq!(renc_startup_with_capacity(4, 8), RencErrorCode::AlreadyRunning);
    shutdown_quietly();
}

#[test]
fn calls_without_runtime_fail() {
    let _guard = SERIAL.lock();
    let mut h = Handle::NULL;
    unsafe {
        assert_eq!(renc_box_integer(1, &mut h), RencErrorCode::NotRunning);
        assert_eq!(renc_shutdown(0, ptr::null_mut()), RencErrorCode::NotRunning);
    }
    assert_eq!(renc_release(h), RencErrorCode::NotRunning);
    assert_eq!(renc_tick(), 0);
}

#[test]
fn shutdown_counts_leaks() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup(), RencErrorCode::Ok);
    let mut a = Handle::NULL;
    let mut b = Handle::NULL;
    unsafe {
        renc_box_integer(1, &mut a);
        renc_box_void(&mut b);
    }
    assert_eq!(renc_retain(a), RencErrorCode::Ok);

    let mut report = RencShutdownReport::default();
    assert_eq!(unsafe { renc_shutdown(3, &mut report) }, RencErrorCode::Ok);
    assert_eq!(report.exit_code, 3);
    assert_eq!(report.leak_count, 2);
}

#[test]
fn bounded_startup_reports_out_of_memory() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup_with_capacity(1, 1), RencErrorCode::Ok);
    let mut a = Handle::NULL;
    let mut b = Handle::NULL;
    unsafe {
        assert_eq!(renc_box_integer(1, &mut a), RencErrorCode::Ok);
        assert_eq!(renc_box_integer(2, &mut b), RencErrorCode::OutOfMemory);
    }
    assert_eq!(renc_release(a), RencErrorCode::Ok);
    unsafe {
        assert_eq!(renc_box_integer(2, &mut b), RencErrorCode::Ok);
    }
    assert_eq!(renc_release(b), RencErrorCode::Ok);
    shutdown_quietly();
}

#[test]
fn invalid_capacity_is_config_error() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup_with_capacity(8, 2), RencErrorCode::Config);
    // nothing was installed
    assert_eq!(renc_tick(), 0);
    assert_eq!(renc_startup(), RencErrorCode::Ok);
    shutdown_quietly();
}

#[test]
fn unreservable_capacity_reports_out_of_memory() {
    let _guard = SERIAL.lock();
    assert_eq!(
        renc_startup_with_capacity(u32::MAX as usize, 0),
        RencErrorCode::OutOfMemory
    );
    // the failed startup released the process claim
    assert_eq!(renc_startup_with_capacity(1, 1), RencErrorCode::Ok);
    shutdown_quietly();
}

// ============================================================================
// Argument and handle checks
// ============================================================================

#[test]
fn null_out_pointer_is_invalid_argument() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup(), RencErrorCode::Ok);
    unsafe {
        assert_eq!(
            renc_box_integer(1, ptr::null_mut()),
            RencErrorCode::InvalidArgument
        );
    }
    let mut report = RencShutdownReport::default();
    unsafe { renc_shutdown(0, &mut report) };
    // the rejected call allocated nothing
    assert_eq!(report.leak_count, 0);
}

#[test]
fn wrong_kind_and_over_release() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup(), RencErrorCode::Ok);
    let mut h = Handle::NULL;
    let mut v = 0i64;
    let mut kind = 0u8;
    unsafe {
        assert_eq!(renc_box_decimal(2.5, &mut h), RencErrorCode::Ok);
        assert_eq!(renc_unbox_integer(h, &mut v), RencErrorCode::TypeMismatch);
        assert_eq!(renc_kind_of(h, &mut kind), RencErrorCode::Ok);
    }
    assert_eq!(CellKind::from_u8(kind), Some(CellKind::Decimal));
    assert_eq!(renc_release(h), RencErrorCode::Ok);
    assert_eq!(renc_release(h), RencErrorCode::UnderflowRelease);
    assert_eq!(renc_release(Handle::NULL), RencErrorCode::InvalidHandle);
    shutdown_quietly();
}

#[test]
fn other_kinds_cross_the_boundary() {
    let _guard = SERIAL.lock();
    assert_eq!(renc_startup(), RencErrorCode::Ok);
    let (mut hl, mut hd, mut hc, mut hb) = (Handle::NULL, Handle::NULL, Handle::NULL, Handle::NULL);
    let (mut l, mut d, mut c) = (false, 0.0f64, 0u32);
    unsafe {
        assert_eq!(renc_box_logic(true, &mut hl), RencErrorCode::Ok);
        assert_eq!(renc_box_decimal(-0.5, &mut hd), RencErrorCode::Ok);
        assert_eq!(renc_box_char('é' as u32, &mut hc), RencErrorCode::Ok);
        assert_eq!(renc_box_blank(&mut hb), RencErrorCode::Ok);
        assert_eq!(renc_box_char(0xD800, &mut hb), RencErrorCode::InvalidArgument);

        assert_eq!(renc_unbox_logic(hl, &mut l), RencErrorCode::Ok);
        assert_eq!(renc_unbox_decimal(hd, &mut d), RencErrorCode::Ok);
        assert_eq!(renc_unbox_char(hc, &mut c), RencErrorCode::Ok);
    }
    assert!(l);
    assert_eq!(d, -0.5);
    assert_eq!(char::from_u32(c), Some('é'));
    for h in [hl, hd, hc, hb] {
        assert_eq!(renc_release(h), RencErrorCode::Ok);
    }
    assert!(renc_tick() > 0);
    shutdown_quietly();
}

#[test]
fn error_messages_are_static_strings() {
    let msg = unsafe { CStr::from_ptr(renc_error_message(RencErrorCode::StaleHandle as i32)) };
    assert_eq!(msg.to_str().unwrap(), "stale handle");
    let unknown = unsafe { CStr::from_ptr(renc_error_message(99)) };
    assert_eq!(unknown.to_str().unwrap(), "unknown error code");
}
