//! Measurement wrapper.
//!
//! Around one target call: start the declared timers, run the call, mark
//! exception counters if it failed, then stop the timers and mark the meters.
//! The exit half runs from a drop guard, so it also happens when the call
//! panics or an async call is dropped before completing.
//!
//! Metrics Facility errors are logged and swallowed. The caller always gets
//! the target call's own outcome.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::Level;

use propulsor_core::error::{MeasureError, Result as SetupResult};
use propulsor_core::{Category, InvocationContext, Measure};

use crate::config::MetricsConfig;
use crate::descriptors::MeasureRegistry;
use crate::facility::{MetricsFacility, TimingContext};

/// Outcome of [`Interceptor::intercept`] when it does not return a value.
#[derive(Debug)]
pub enum Intercepted<E> {
    /// No measure could be resolved; the target call never ran.
    Setup(MeasureError),
    /// The target call failed. The error is passed through untouched.
    Target(E),
}

impl<E> Intercepted<E> {
    pub fn is_setup(&self) -> bool {
        matches!(self, Intercepted::Setup(_))
    }

    pub fn setup_error(&self) -> Option<&MeasureError> {
        match self {
            Intercepted::Setup(e) => Some(e),
            Intercepted::Target(_) => None,
        }
    }

    pub fn into_target(self) -> Option<E> {
        match self {
            Intercepted::Setup(_) => None,
            Intercepted::Target(e) => Some(e),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Intercepted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intercepted::Setup(e) => write!(f, "measurement setup failed: {e}"),
            Intercepted::Target(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl<E: Error + 'static> Error for Intercepted<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Intercepted::Setup(e) => Some(e),
            Intercepted::Target(e) => e.source(),
        }
    }
}

/// Wraps target calls with timers and counters.
///
/// Cheap to clone; all clones share the facility and the descriptor registry.
#[derive(Clone)]
pub struct Interceptor {
    inner: Arc<InterceptorInner>,
}

struct InterceptorInner {
    facility: Arc<dyn MetricsFacility>,
    descriptors: Arc<MeasureRegistry>,
    enabled: bool,
    prefix: String,
}

impl Interceptor {
    pub fn new(
        facility: Arc<dyn MetricsFacility>,
        descriptors: Arc<MeasureRegistry>,
        cfg: &MetricsConfig,
    ) -> Self {
        Self {
            inner: Arc::new(InterceptorInner {
                facility,
                descriptors,
                enabled: cfg.is_enabled(),
                prefix: cfg.instance_prefix().to_string(),
            }),
        }
    }

    /// Build with descriptors taken from the config's `measures` section.
    pub fn from_config(
        cfg: &MetricsConfig,
        facility: Arc<dyn MetricsFacility>,
    ) -> SetupResult<Self> {
        let descriptors = MeasureRegistry::from_config(cfg)?;
        Ok(Self::new(facility, Arc::new(descriptors), cfg))
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    pub fn descriptors(&self) -> Arc<MeasureRegistry> {
        Arc::clone(&self.inner.descriptors)
    }

    /// Run `call` under the measure registered for `ctx`.
    pub fn intercept<T, E, F>(
        &self,
        ctx: &InvocationContext,
        call: F,
    ) -> Result<T, Intercepted<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.inner.enabled {
            return call().map_err(Intercepted::Target);
        }
        trace_invocation(ctx);
        let measure = self
            .inner
            .descriptors
            .resolve(ctx)
            .map_err(Intercepted::Setup)?;
        self.run(&measure, ctx, call).map_err(Intercepted::Target)
    }

    /// Run `call` under an explicit measure.
    pub fn measure<T, E, F>(
        &self,
        measure: &Measure,
        ctx: &InvocationContext,
        call: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.inner.enabled {
            return call();
        }
        trace_invocation(ctx);
        self.run(measure, ctx, call)
    }

    /// Async form of [`Interceptor::intercept`].
    pub async fn intercept_async<T, E, Fut>(
        &self,
        ctx: &InvocationContext,
        call: Fut,
    ) -> Result<T, Intercepted<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.inner.enabled {
            return call.await.map_err(Intercepted::Target);
        }
        trace_invocation(ctx);
        let measure = self
            .inner
            .descriptors
            .resolve(ctx)
            .map_err(Intercepted::Setup)?;
        let exit = self.enter(&measure, ctx);
        let out = call.await;
        exit.settle(out.is_err());
        out.map_err(Intercepted::Target)
    }

    /// Async form of [`Interceptor::measure`].
    pub async fn measure_async<T, E, Fut>(
        &self,
        measure: &Measure,
        ctx: &InvocationContext,
        call: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.inner.enabled {
            return call.await;
        }
        trace_invocation(ctx);
        let exit = self.enter(measure, ctx);
        let out = call.await;
        exit.settle(out.is_err());
        out
    }

    fn run<T, E, F>(&self, measure: &Measure, ctx: &InvocationContext, call: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let exit = self.enter(measure, ctx);
        let out = call();
        exit.settle(out.is_err());
        out
    }

    fn enter<'a>(&'a self, measure: &'a Measure, ctx: &InvocationContext) -> Exit<'a> {
        let facility = self.inner.facility.as_ref();
        let default_name = facility.default_name(ctx);
        let mut exit = Exit {
            facility,
            prefix: &self.inner.prefix,
            default_name,
            measure,
            timing: None,
            settled: false,
        };

        let timers = exit.names(&measure.timers, Category::Timer);
        match facility.time_all(&timers) {
            Ok(t) => exit.timing = Some(t),
            Err(e) => tracing::warn!(call = %ctx, error = %e, "failed to start timers"),
        }
        exit
    }
}

fn trace_invocation(ctx: &InvocationContext) {
    if tracing::enabled!(Level::TRACE) {
        let data = serde_json::to_string(ctx.data()).unwrap_or_default();
        tracing::trace!(group = ctx.group(), method = ctx.method(), %data, "gathering metrics");
    }
}

/// Exit half of one measured invocation.
///
/// `settle` records a normal return or a failure; dropping without settling
/// counts as a failure (panic or cancellation).
struct Exit<'a> {
    facility: &'a dyn MetricsFacility,
    prefix: &'a str,
    default_name: String,
    measure: &'a Measure,
    timing: Option<Box<dyn TimingContext>>,
    settled: bool,
}

impl Exit<'_> {
    fn names(&self, raw: &[String], category: Category) -> BTreeSet<String> {
        raw.iter()
            .map(|n| self.facility.name(self.prefix, n, &self.default_name, category))
            .collect()
    }

    fn mark(&self, raw: &[String], category: Category) {
        let names = self.names(raw, category);
        if let Err(e) = self.facility.mark(&names) {
            tracing::warn!(
                call = %self.default_name,
                %category,
                error = %e,
                "failed to mark counters"
            );
        }
    }

    fn settle(mut self, failed: bool) {
        // set first: a panicking facility must not get a second exception mark from drop
        self.settled = true;
        if failed {
            self.mark(&self.measure.exceptions, Category::Exception);
        }
    }
}

impl Drop for Exit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(call = %self.default_name, "measured call exited abnormally");
            self.mark(&self.measure.exceptions, Category::Exception);
        }
        if let Some(timing) = self.timing.take() {
            if let Err(e) = timing.stop() {
                tracing::warn!(call = %self.default_name, error = %e, "failed to stop timers");
            }
        }
        self.mark(&self.measure.meters, Category::Meter);
    }
}
