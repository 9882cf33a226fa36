//! Measurement descriptors and invocation identity.
//!
//! A `Measure` is the declarative part of instrumentation: which timers to
//! run around a call, which meters to mark on every exit, and which
//! exception counters to mark when the call fails. Lists may be empty.
//! An empty entry (`""`) stands for the call's default name.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Measurement descriptor attached to a method or to its enclosing group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Measure {
    #[serde(default)]
    pub timers: Vec<String>,
    #[serde(default)]
    pub meters: Vec<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl Measure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn meters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meters = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn exceptions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exceptions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Measure that times and meters the call under its default name.
    pub fn defaults() -> Self {
        Self::new().timers([""]).meters([""]).exceptions([""])
    }
}

/// Identity of one invoked operation plus free-form diagnostic data.
///
/// `group` plays the role of the enclosing type or module, `method` the
/// callable inside it. `data` is only ever logged.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationContext {
    group: String,
    method: String,
    data: BTreeMap<String, Value>,
}

impl InvocationContext {
    pub fn new(group: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            method: method.into(),
            data: BTreeMap::new(),
        }
    }

    /// Attach a diagnostic key/value.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

impl fmt::Display for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group, self.method)
    }
}
