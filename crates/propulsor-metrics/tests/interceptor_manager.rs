//! Interceptor against the in-memory `MetricsManager`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use propulsor_core::{InvocationContext, Measure};
use propulsor_metrics::{config, Interceptor, MetricsManager};

const CFG: &str = r#"
version: 1
metrics:
  instance_prefix: "node-1"
measures:
  - group: "OrderService"
    timers: [""]
    meters: ["calls"]
    exceptions: ["errors"]
  - group: "OrderService"
    method: "cancel"
    meters: ["cancels"]
"#;

fn setup() -> (Interceptor, MetricsManager) {
    let cfg = config::load_from_str(CFG).unwrap();
    let mgr = MetricsManager::new();
    let icpt = Interceptor::from_config(&cfg, Arc::new(mgr.clone())).unwrap();
    (icpt, mgr)
}

#[test]
fn config_declared_measures_are_recorded() {
    let (icpt, mgr) = setup();
    let place = InvocationContext::new("OrderService", "place").with_data("order", 42);

    let _ = icpt.intercept::<_, String, _>(&place, || Ok(()));
    let _ = icpt.intercept::<(), _, _>(&place, || Err("rejected".to_string()));

    let reg = mgr.registry();
    assert_eq!(reg.timers.count("node-1.OrderService.place.timer"), 2);
    assert_eq!(reg.meters.count("node-1.calls.meter"), 2);
    assert_eq!(reg.meters.count("node-1.errors.exception"), 1);
}

#[test]
fn method_entry_from_config_replaces_group_entry() {
    let (icpt, mgr) = setup();
    let cancel = InvocationContext::new("OrderService", "cancel");

    let _ = icpt.intercept::<(), String, _>(&cancel, || Ok(()));

    let reg = mgr.registry();
    assert_eq!(reg.meters.count("node-1.cancels.meter"), 1);
    assert_eq!(reg.meters.count("node-1.calls.meter"), 0);
    assert!(reg.timers.names().is_empty());
}

#[test]
fn panic_still_stops_timers_and_marks_counters() {
    let mgr = MetricsManager::new();
    let icpt = Interceptor::new(
        Arc::new(mgr.clone()),
        Arc::default(),
        &propulsor_metrics::MetricsConfig::default(),
    );
    let measure = Measure::new().timers(["t"]).meters(["m"]).exceptions(["e"]);
    let ctx = InvocationContext::new("Worker", "run");

    let caught = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), ()> = icpt.measure(&measure, &ctx, || panic!("boom"));
    }));
    assert!(caught.is_err());

    let reg = mgr.registry();
    assert_eq!(reg.timers.count("t.timer"), 1);
    assert_eq!(reg.meters.count("e.exception"), 1);
    assert_eq!(reg.meters.count("m.meter"), 1);
}

#[test]
fn concurrent_invocations_share_one_facility() {
    let (icpt, mgr) = setup();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let icpt = icpt.clone();
            thread::spawn(move || {
                let ctx = InvocationContext::new("OrderService", "place");
                for _ in 0..100 {
                    let _ = icpt.intercept::<(), String, _>(&ctx, || Ok(()));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let reg = mgr.registry();
    assert_eq!(reg.meters.count("node-1.calls.meter"), 800);
    assert_eq!(reg.timers.count("node-1.OrderService.place.timer"), 800);
}

#[test]
fn render_lists_recorded_names() {
    let (icpt, mgr) = setup();
    let place = InvocationContext::new("OrderService", "place");
    let _ = icpt.intercept::<(), String, _>(&place, || Ok(()));

    let out = mgr.registry().render();
    assert!(out.contains("propulsor_meter_total{name=\"node-1.calls.meter\"} 1"));
    assert!(out.contains(
        "propulsor_timer_micros_count{name=\"node-1.OrderService.place.timer\"} 1"
    ));
}
