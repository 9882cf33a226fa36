use std::sync::Arc;

use dashmap::DashMap;

use propulsor_core::error::{MeasureError, Result};
use propulsor_core::{InvocationContext, Measure};

use crate::config::MetricsConfig;

/// Registry of measurement descriptors keyed by callable identity.
///
/// Populated at setup time. Lookups prefer a method-level entry and fall back
/// to the group-level one.
#[derive(Default)]
pub struct MeasureRegistry {
    methods: DashMap<(String, String), Arc<Measure>>,
    groups: DashMap<String, Arc<Measure>>,
}

impl MeasureRegistry {
    pub fn new() -> Self {
        Self {
            methods: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Build from the `measures` section of a validated config.
    pub fn from_config(cfg: &MetricsConfig) -> Result<Self> {
        cfg.validate()?;
        let reg = Self::new();
        for m in &cfg.measures {
            match &m.method {
                Some(method) => reg.register_method(m.group.clone(), method.clone(), m.measure()),
                None => reg.register_group(m.group.clone(), m.measure()),
            }
        }
        Ok(reg)
    }

    pub fn register_method(
        &self,
        group: impl Into<String>,
        method: impl Into<String>,
        measure: Measure,
    ) {
        self.methods
            .insert((group.into(), method.into()), Arc::new(measure));
    }

    pub fn register_group(&self, group: impl Into<String>, measure: Measure) {
        self.groups.insert(group.into(), Arc::new(measure));
    }

    pub fn len(&self) -> usize {
        self.methods.len() + self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resolve(&self, ctx: &InvocationContext) -> Result<Arc<Measure>> {
        let key = (ctx.group().to_string(), ctx.method().to_string());
        if let Some(m) = self.methods.get(&key) {
            return Ok(Arc::clone(m.value()));
        }
        if let Some(m) = self.groups.get(ctx.group()) {
            return Ok(Arc::clone(m.value()));
        }
        Err(MeasureError::MissingDescriptor {
            group: ctx.group().to_string(),
            method: ctx.method().to_string(),
        })
    }
}
