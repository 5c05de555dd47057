//! Scheduler configuration loading.
//!
//! Every field is optional; absent values fall back to the defaults of the
//! reference board (1 s tick, five task slots, periods of 5–10 ticks, 200 ms
//! button debounce).  Command-line flags override file values in `main`.
//!
//! The expected YAML structure is:
//! ```yaml
//! scheduler:
//!   tick_ms: 1000
//!   capacity: 5
//!   period_min: 5
//!   period_max: 10
//!   debounce_ms: 200
//!   poll_timeout_ms: 10
//!   seed: 42
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::scheduler::ConfigError;

/// Upper bound on `capacity`.  Task storage and the trigger queue are
/// allocated for the full capacity at start-up.
pub const MAX_CAPACITY: usize = 1 << 16;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    scheduler: SchedulerConfig,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Runtime parameters of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Length of one tick in milliseconds.
    pub tick_ms: u64,

    /// Maximum number of concurrently admitted tasks (`C`).
    pub capacity: usize,

    /// Inclusive lower bound of the drawn period, in ticks.
    pub period_min: u64,

    /// Inclusive upper bound of the drawn period, in ticks.
    pub period_max: u64,

    /// Minimum spacing between accepted trigger edges, in milliseconds.
    pub debounce_ms: u64,

    /// Bounded wait for an admission event at the top of each tick.
    pub poll_timeout_ms: u64,

    /// PRNG seed.  `None` seeds from the wall clock.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            capacity: 5,
            period_min: 5,
            period_max: 10,
            debounce_ms: 200,
            poll_timeout_ms: 10,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Parses and validates the YAML file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is structurally
    /// invalid, or a value fails [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scheduler configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse YAML document")?;
        let config = file.scheduler;
        config.validate()?;

        debug!(?config, "scheduler configuration parsed");
        Ok(config)
    }

    /// Checks the invariants the scheduler relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.period_min == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.period_min > self.period_max {
            return Err(ConfigError::EmptyPeriodRange {
                min: self.period_min,
                max: self.period_max,
            });
        }
        if self.poll_timeout_ms >= self.tick_ms {
            return Err(ConfigError::PollTooLong {
                poll_ms: self.poll_timeout_ms,
                tick_ms: self.tick_ms,
            });
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
