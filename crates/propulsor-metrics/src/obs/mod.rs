//! Observability plumbing: the in-process metrics store and tracing setup.

pub mod metrics;

use tracing_subscriber::{fmt, EnvFilter};

pub use metrics::{MeterSet, MetricsRegistry, TimerSet};

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
}
