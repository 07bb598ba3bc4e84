//! Tracing subscriber setup for test binaries.
//!
//! Locus emits `tracing` events (fallback attempts at `debug`, total misses
//! at `warn`, page actions at `trace`). Nothing is printed unless a
//! subscriber is installed; suites call [`init_tracing`] once, typically from
//! a fixture or the first test. `RUST_LOG` overrides the verbosity default.

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human-readable output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Filter directive for a verbosity level.
///
/// 0 = warnings only (total misses), 1 = debug for locus (every fallback
/// attempt), 2+ = trace for everything.
#[must_use]
pub const fn filter_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,locus=debug",
        _ => "trace",
    }
}

/// Install a global stderr subscriber.
///
/// Returns `false` when a subscriber is already installed, so repeated
/// calls from several tests are harmless.
pub fn init_tracing(verbosity: u8, format: LogFormat) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbosity)));
    let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(stderr)
        .with_target(true)
        .with_level(true);

    match format {
        LogFormat::Compact => builder.compact().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
