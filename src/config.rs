use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::entry::Entry;

/// Dispatcher configuration, typically loaded from a TOML file embedded in
/// the host application's config.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Destination URL for batch delivery.
    pub endpoint: String,
    /// Cadence of the periodic flush loop.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
    /// Queue length at which a flush is triggered eagerly.
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// Hard cap on buffered records; the oldest are dropped past it.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    /// Minimum wait after a failed delivery before another attempt.
    /// Zero retries on every trigger.
    #[serde(default)]
    pub retry_backoff_secs: u64,
    /// Record fields to keep in delivered batches. Mutually exclusive with
    /// `exclude`.
    #[serde(default)]
    pub include: Option<Vec<String>>,
    /// Record fields to remove from delivered batches.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

fn default_flush_interval_secs() -> u64 {
    10
}

fn default_threshold() -> usize {
    10_000
}

fn default_max_pending() -> usize {
    100_000
}

impl Config {
    /// A config with defaults for everything but the endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            flush_interval_secs: default_flush_interval_secs(),
            threshold: default_threshold(),
            max_pending: default_max_pending(),
            retry_backoff_secs: 0,
            include: None,
            exclude: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            bail!("endpoint must not be empty");
        }
        if self.threshold == 0 {
            bail!("threshold must be at least 1");
        }
        if self.max_pending < self.threshold {
            bail!(
                "max_pending ({}) must not be smaller than threshold ({})",
                self.max_pending,
                self.threshold
            );
        }
        if self.include.is_some() && self.exclude.is_some() {
            bail!("include and exclude cannot be specified together");
        }
        for key in self.include.iter().chain(self.exclude.iter()).flatten() {
            if !Entry::FIELD_NAMES.contains(&key.as_str()) {
                bail!("unknown record field: {key}");
            }
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    pub fn retry_backoff(&self) -> Option<Duration> {
        match self.retry_backoff_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
