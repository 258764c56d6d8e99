//! Subscriber setup for binaries and tests embedding the engine.
//!
//! Library code only emits `tracing` events; nothing is printed unless a
//! subscriber is installed.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr fmt subscriber at `level` (e.g. "info", "sigtrader=debug").
/// `RUST_LOG` wins when set. Returns false if a global subscriber was already
/// installed, which is not an error.
pub fn init(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
        .is_ok()
}
