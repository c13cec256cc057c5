//! Tracing bootstrap for binaries.
//!
//! Library crates only emit `tracing` events; installing a subscriber is left
//! to the process entry point.

use crate::error::CommonError;
use crate::result::CommonResult;
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a configured filter is set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a formatted subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
///
/// Calling this more than once returns an error instead of panicking.
pub fn init_tracing(default_filter: &str) -> CommonResult<()> {
    let fallback = if default_filter.trim().is_empty() {
        DEFAULT_LOG_FILTER
    } else {
        default_filter
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| CommonError::Logging(e.to_string()))
}
