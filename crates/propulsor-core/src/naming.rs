//! Metric name resolution.
//!
//! A resolved name is `prefix.name.category` with empty segments skipped.
//! An empty raw name resolves to the call's default name, so `""` in a
//! `Measure` list means "this call".

use std::fmt;

use serde::Deserialize;

use crate::measure::InvocationContext;

/// Namespacing tag keeping timer, meter and exception names apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Timer,
    Meter,
    Exception,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Timer => "timer",
            Category::Meter => "meter",
            Category::Exception => "exception",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default name of an invocation: `group.method`.
pub fn default_name(ctx: &InvocationContext) -> String {
    join(&[ctx.group(), ctx.method()])
}

/// Resolve a fully-qualified metric name.
pub fn metric_name(prefix: &str, raw: &str, default: &str, category: Category) -> String {
    let raw = raw.trim();
    let name = if raw.is_empty() { default } else { raw };
    join(&[prefix.trim(), name, category.as_str()])
}

fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}
