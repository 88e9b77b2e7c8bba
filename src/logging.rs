//! Tracing subscriber setup
//!
//! Diagnostics go to stderr through `tracing`; the per-year progress lines on
//! stdout are plain `println!` output and unaffected by the filter.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the level chosen by
/// `verbose`. Calling this more than once keeps the first subscriber.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .try_init();
}
