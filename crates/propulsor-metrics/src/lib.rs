//! propulsor metrics library entry.
//!
//! This crate wires the config loader, the descriptor registry, the Metrics
//! Facility, and the measurement interceptor together. Host code builds an
//! `Interceptor` once at startup and routes measured calls through it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Metrics problems
//! are logged and never take down the instrumented call.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod descriptors;
pub mod facility;
pub mod interceptor;
pub mod obs;

pub use config::MetricsConfig;
pub use descriptors::MeasureRegistry;
pub use facility::{MetricsFacility, MetricsManager, TimingContext};
pub use interceptor::{Intercepted, Interceptor};
pub use obs::{init_tracing, MetricsRegistry};
