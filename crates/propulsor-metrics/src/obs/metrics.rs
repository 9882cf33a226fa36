//! In-memory metrics registry backing the default Metrics Facility.
//!
//! Meters and timers are keyed by their fully-qualified dotted name and
//! stored in `DashMap`s of atomics, so marking and timing from many threads
//! never takes a global lock. Timer histogram buckets are fixed in
//! microseconds to avoid floating point math.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Named occurrence counters.
#[derive(Default)]
pub struct MeterSet {
    map: DashMap<String, AtomicU64>,
}

impl MeterSet {
    /// Increment by 1.
    pub fn mark(&self, name: &str) {
        self.add(name, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, name: &str, v: u64) {
        if let Some(counter) = self.map.get(name) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self
            .map
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current count, zero for unknown names.
    pub fn count(&self, name: &str) -> u64 {
        self.map
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Render in Prometheus text exposition format, one series per name.
    fn render(&self, metric: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", metric);
        for name in self.names() {
            let _ = writeln!(
                out,
                "{}{{name=\"{}\"}} {}",
                metric,
                escape_label(&name),
                self.count(&name)
            );
        }
    }
}

// Fixed Buckets in Microseconds (µs)
// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
const BUCKETS_MICROS: [u64; 9] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

/// Named duration histograms.
#[derive(Default)]
pub struct TimerSet {
    map: DashMap<String, AtomicHistogram>,
}

impl TimerSet {
    /// Observe a duration and increment cumulative buckets (microsecond scale).
    pub fn observe(&self, name: &str, duration: Duration) {
        let hist = self
            .map
            .entry(name.to_string())
            .or_insert_with(AtomicHistogram::default);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);

        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of completed timings, zero for unknown names.
    pub fn count(&self, name: &str) -> u64 {
        self.map
            .get(name)
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Total observed time in microseconds.
    pub fn sum_micros(&self, name: &str) -> u64 {
        self.map
            .get(name)
            .map(|h| h.sum.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Render in Prometheus text exposition format (unit: microseconds).
    fn render(&self, metric: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} histogram", metric);
        for name in self.names() {
            let Some(hist) = self.map.get(&name) else { continue };
            let label = format!("name=\"{}\"", escape_label(&name));

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{},le=\"{}\"}} {}", metric, label, le, count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{},le=\"+Inf\"}} {}", metric, label, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", metric, label, sum);
            let _ = writeln!(out, "{}_count{{{}}} {}", metric, label, count);
        }
    }
}

#[derive(Default)]
pub struct MetricsRegistry {
    pub meters: MeterSet,
    pub timers: TimerSet,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render all meters and timers for inspection.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.meters.render("propulsor_meter_total", &mut out);
        self.timers.render("propulsor_timer_micros", &mut out); // Explicit unit
        out
    }
}
