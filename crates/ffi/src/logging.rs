//! Subscriber installation for embedders
//!
//! The library crates only emit `tracing` events. A C host has no way to
//! install a subscriber itself, so [`init_logging`] does it: a `fmt` layer on
//! stderr filtered by `RENC_LOG` (same syntax as `RUST_LOG`), `warn` when the
//! variable is unset or unparsable.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "RENC_LOG";

const DEFAULT_FILTER: &str = "warn";

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Install the global subscriber once
///
/// Returns `false` if another subscriber was already installed by the host,
/// in which case events go there. Later calls return the first result.
pub fn init_logging() -> bool {
    *INSTALLED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .is_ok()
    })
}
