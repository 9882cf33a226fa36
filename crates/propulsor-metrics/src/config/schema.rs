use std::collections::HashSet;

use serde::Deserialize;
use propulsor_core::error::{MeasureError, Result};
use propulsor_core::Measure;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    pub version: u32,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub measures: Vec<MeasureConfig>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            version: 1,
            metrics: MetricsSection::default(),
            measures: Vec::new(),
        }
    }
}

impl MetricsConfig {
    /// Enabled config with the given instance prefix and no declared measures.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let mut cfg = Self::default();
        cfg.metrics.instance_prefix = prefix.into();
        cfg
    }

    /// Config with instrumentation switched off.
    pub fn disabled() -> Self {
        let mut cfg = Self::default();
        cfg.metrics.enabled = false;
        cfg
    }

    pub fn is_enabled(&self) -> bool {
        self.metrics.enabled
    }

    pub fn instance_prefix(&self) -> &str {
        &self.metrics.instance_prefix
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeasureError::UnsupportedVersion);
        }

        let mut seen = HashSet::new();
        for m in &self.measures {
            m.validate()?;
            if !seen.insert((m.group.as_str(), m.method.as_deref())) {
                return Err(MeasureError::BadConfig(format!(
                    "duplicate measure for {}",
                    m.target()
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub instance_prefix: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            instance_prefix: String::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// One declared measure. Without `method` it applies to the whole group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeasureConfig {
    pub group: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub timers: Vec<String>,
    #[serde(default)]
    pub meters: Vec<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

impl MeasureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.group.trim().is_empty() {
            return Err(MeasureError::BadConfig("measures[].group must not be empty".into()));
        }
        if matches!(self.method.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(MeasureError::BadConfig(format!(
                "measure for group {} has an empty method",
                self.group
            )));
        }
        Ok(())
    }

    pub fn measure(&self) -> Measure {
        Measure::new()
            .timers(self.timers.iter().cloned())
            .meters(self.meters.iter().cloned())
            .exceptions(self.exceptions.iter().cloned())
    }

    fn target(&self) -> String {
        match &self.method {
            Some(m) => format!("{}.{}", self.group, m),
            None => self.group.clone(),
        }
    }
}
