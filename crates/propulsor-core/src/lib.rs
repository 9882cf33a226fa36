//! propulsor core: measurement descriptors, naming rules, and error types.
//!
//! This crate defines the contracts shared by the interceptor and any
//! Metrics Facility implementation: what a measured call declares
//! (`Measure`), how metric names are derived (`naming`), and the error
//! surface. It carries no runtime or storage dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Fallible paths surface as `MeasureError`/`MetricsError` so an
//! instrumented process never crashes because of its metrics.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod measure;
pub mod naming;

pub use error::{MeasureError, MetricsError, Result};
pub use measure::{InvocationContext, Measure};
pub use naming::{default_name, metric_name, Category};
