//! Metrics Facility seam and its in-memory default.
//!
//! The interceptor only talks to `MetricsFacility`. Every method must be
//! safe to call concurrently from many invocations and should not block.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use propulsor_core::{naming, Category, InvocationContext, MetricsError};

use crate::obs::MetricsRegistry;

/// One or more running timers, started together.
pub trait TimingContext: Send {
    /// Stop every timer held. Consumes the handle so it can only run once.
    fn stop(self: Box<Self>) -> Result<(), MetricsError>;
}

pub trait MetricsFacility: Send + Sync {
    /// Name identifying the invoked operation, used for empty name entries.
    fn default_name(&self, ctx: &InvocationContext) -> String {
        naming::default_name(ctx)
    }

    /// Fully-qualified metric name for one raw entry.
    fn name(&self, prefix: &str, raw: &str, default: &str, category: Category) -> String {
        naming::metric_name(prefix, raw, default, category)
    }

    /// Start a timer for every name in the set.
    fn time_all(&self, names: &BTreeSet<String>) -> Result<Box<dyn TimingContext>, MetricsError>;

    /// Mark each named counter once.
    fn mark(&self, names: &BTreeSet<String>) -> Result<(), MetricsError>;
}

/// Default facility recording into a shared `MetricsRegistry`.
#[derive(Clone, Default)]
pub struct MetricsManager {
    registry: Arc<MetricsRegistry>,
}

impl MetricsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.registry)
    }
}

fn check_names(names: &BTreeSet<String>) -> Result<(), MetricsError> {
    match names.iter().find(|n| n.trim().is_empty()) {
        Some(bad) => Err(MetricsError::InvalidName(bad.clone())),
        None => Ok(()),
    }
}

impl MetricsFacility for MetricsManager {
    fn time_all(&self, names: &BTreeSet<String>) -> Result<Box<dyn TimingContext>, MetricsError> {
        check_names(names)?;
        Ok(Box::new(Timings {
            registry: Arc::clone(&self.registry),
            names: names.iter().cloned().collect(),
            started: Instant::now(),
        }))
    }

    fn mark(&self, names: &BTreeSet<String>) -> Result<(), MetricsError> {
        check_names(names)?;
        for n in names {
            self.registry.meters.mark(n);
        }
        Ok(())
    }
}

struct Timings {
    registry: Arc<MetricsRegistry>,
    names: Vec<String>,
    started: Instant,
}

impl TimingContext for Timings {
    fn stop(self: Box<Self>) -> Result<(), MetricsError> {
        let elapsed = self.started.elapsed();
        for n in &self.names {
            self.registry.timers.observe(n, elapsed);
        }
        Ok(())
    }
}
