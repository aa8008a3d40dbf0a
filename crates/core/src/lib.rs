//! Core types for renc
//!
//! This crate defines the fundamental types shared by every layer:
//! - [`Cell`], [`CellKind`], [`Payload`]: the boxed value and its tag
//! - [`Handle`]: the opaque reference handed to callers
//! - [`Error`]: the error taxonomy
//! - [`RuntimeConfig`]: arena sizing and threading mode

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod config;
pub mod error;
pub mod handle;

pub use cell::{Cell, CellKind, Payload};
pub use config::{RuntimeConfig, ThreadingMode, DEFAULT_INITIAL_CAPACITY, MAX_ADDRESSABLE_SLOTS};
pub use error::{Error, Result};
pub use handle::Handle;
