//! Tracing setup for the crawler binary.
//!
//! One compact stdout layer filtered through `RUST_LOG` (default "info").
//! Worker threads are named, so thread names in the output identify which
//! worker produced each event.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .try_init();
}
