//! C ABI for renc
//!
//! Exposes the boxing runtime to foreign callers as `renc_*` functions over a
//! single process-wide runtime:
//!
//! ```c
//! RencHandle h;
//! int64_t v;
//! renc_startup();
//! renc_box_integer(1, &h);
//! renc_unbox_integer(h, &v);
//! renc_release(h);
//! renc_shutdown(1, NULL);
//! ```
//!
//! Handles are passed by value (`{ uint32_t index; uint32_t generation; }`).
//! Fallible calls return [`RencErrorCode`], zero on success.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod error;
pub mod logging;

pub use boundary::*;
pub use error::RencErrorCode;
pub use logging::{init_logging, LOG_ENV};
