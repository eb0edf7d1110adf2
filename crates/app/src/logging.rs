//! Tracing initialisation.
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter for a `-v` count: none honours `RUST_LOG` (default `info`),
/// one raises to `debug`, more to `trace`.
#[must_use]
pub fn filter_for(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_tracing(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbosity))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
