//! Error codes crossing the C boundary
//!
//! Every [`renc_core::Error`] variant has exactly one code. `Ok` is zero so
//! callers can test results with `if (rc)`. `InvalidArgument` covers inputs
//! that never reach the runtime (null out-pointers, non-scalar characters).

use renc_core::Error;
use std::os::raw::c_char;

/// Result code of every fallible `renc_*` call
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RencErrorCode {
    /// Operation succeeded
    Ok = 0,
    /// `startup` while running
    AlreadyRunning = 1,
    /// Call outside `startup`..`shutdown`
    NotRunning = 2,
    /// Arena at its hard bound
    OutOfMemory = 3,
    /// Slot freed twice
    DoubleFree = 4,
    /// Release of a cell with no owners
    UnderflowRelease = 5,
    /// Accessor does not match the cell kind
    TypeMismatch = 6,
    /// Handle never issued
    InvalidHandle = 7,
    /// Handle to a slot that was since reused
    StaleHandle = 8,
    /// Rejected configuration
    Config = 9,
    /// Null out-pointer or unrepresentable input
    InvalidArgument = 10,
}

impl RencErrorCode {
    /// Every code in numeric order
    pub const ALL: [RencErrorCode; 11] = [
        RencErrorCode::Ok,
        RencErrorCode::AlreadyRunning,
        RencErrorCode::NotRunning,
        RencErrorCode::OutOfMemory,
        RencErrorCode::DoubleFree,
        RencErrorCode::UnderflowRelease,
        RencErrorCode::TypeMismatch,
        RencErrorCode::InvalidHandle,
        RencErrorCode::StaleHandle,
        RencErrorCode::Config,
        RencErrorCode::InvalidArgument,
    ];

    /// Decode a raw code received from C
    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Check for success
    #[inline]
    pub fn is_ok(self) -> bool {
        self == RencErrorCode::Ok
    }

    /// Static NUL-terminated description
    pub fn message(self) -> &'static [u8] {
        match self {
            RencErrorCode::Ok => b"ok\0",
            RencErrorCode::AlreadyRunning => b"runtime already running\0",
            RencErrorCode::NotRunning => b"runtime not running\0",
            RencErrorCode::OutOfMemory => b"arena exhausted\0",
            RencErrorCode::DoubleFree => b"double free\0",
            RencErrorCode::UnderflowRelease => b"release of a cell with no owners\0",
            RencErrorCode::TypeMismatch => b"type mismatch\0",
            RencErrorCode::InvalidHandle => b"invalid handle\0",
            RencErrorCode::StaleHandle => b"stale handle\0",
            RencErrorCode::Config => b"invalid configuration\0",
            RencErrorCode::InvalidArgument => b"invalid argument\0",
        }
    }

    pub(crate) fn message_ptr(self) -> *const c_char {
        self.message().as_ptr().cast()
    }
}

impl From<&Error> for RencErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::AlreadyRunning => RencErrorCode::AlreadyRunning,
            Error::NotRunning => RencErrorCode::NotRunning,
            Error::OutOfMemory { .. } => RencErrorCode::OutOfMemory,
            Error::DoubleFree { .. } => RencErrorCode::DoubleFree,
            Error::UnderflowRelease { .. } => RencErrorCode::UnderflowRelease,
            Error::TypeMismatch { .. } => RencErrorCode::TypeMismatch,
            Error::InvalidHandle { .. } => RencErrorCode::InvalidHandle,
            Error::StaleHandle { .. } => RencErrorCode::StaleHandle,
            Error::Config(_) => RencErrorCode::Config,
        }
    }
}

impl From<Error> for RencErrorCode {
    fn from(err: Error) -> Self {
        RencErrorCode::from(&err)
    }
}

impl<T> From<&renc_core::Result<T>> for RencErrorCode {
    fn from(result: &renc_core::Result<T>) -> Self {
        match result {
            Ok(_) => RencErrorCode::Ok,
            Err(e) => e.into(),
        }
    }
}
