//! CLI settings: an optional TOML file, then flag/env overrides.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use slot_engine::query::{QueryLimits, DEFAULT_MAX_SPAN_DAYS};
use slot_engine::DstPolicy;

/// ```toml
/// max_span_days = 90
/// dst_policy = "shift_forward"
/// log_level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub max_span_days: u64,
    pub dst_policy: DstPolicy,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
            dst_policy: DstPolicy::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or use defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply command-line overrides on top of the file values.
    pub fn with_overrides(
        mut self,
        max_span_days: Option<u64>,
        dst_policy: Option<DstPolicy>,
        log_level: Option<String>,
    ) -> Self {
        if let Some(max) = max_span_days {
            self.max_span_days = max;
        }
        if let Some(policy) = dst_policy {
            self.dst_policy = policy;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    pub fn limits(&self) -> QueryLimits {
        QueryLimits {
            max_span_days: self.max_span_days,
        }
    }
}
