//! Top-level facade crate for propulsor.
//!
//! Re-exports core types and the metrics library so users can depend on a single crate.

pub mod core {
    pub use propulsor_core::*;
}

pub mod metrics {
    pub use propulsor_metrics::*;
}

pub use propulsor_core::{InvocationContext, Measure};
pub use propulsor_metrics::{Intercepted, Interceptor, MetricsConfig, MetricsManager};
