//! Structured logging setup.
//!
//! The library itself only emits `tracing` events; this helper wires a
//! subscriber for binaries and tests that want them rendered. Level
//! selection follows `RUST_LOG` with an `info` fallback.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the process-wide subscriber. Safe to call more than once;
/// later calls are no-ops, as is calling it when a subscriber is already
/// installed by the embedding application.
pub fn init() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
