use crate::error::{IdlewatchError, Result};
use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Idle monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Total inactivity duration before the session is considered idle (ms)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How early before expiry the warning prompt opens (ms)
    #[serde(default = "default_warning_threshold_ms")]
    pub warning_threshold_ms: u64,

    /// Minimum spacing between recorded activity events (ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How often remaining time is recomputed and republished (ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            warning_threshold_ms: default_warning_threshold_ms(),
            debounce_ms: default_debounce_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl MonitorConfig {
    /// Create a new MonitorConfig builder
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::new()
    }

    /// Load monitor configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = get_env_with_prefix("IDLE_TIMEOUT_MS") {
            if let Ok(v) = ms.parse() {
                config.timeout_ms = v;
            }
        }

        if let Some(ms) = get_env_with_prefix("IDLE_WARNING_THRESHOLD_MS") {
            if let Ok(v) = ms.parse() {
                config.warning_threshold_ms = v;
            }
        }

        if let Some(ms) = get_env_with_prefix("IDLE_DEBOUNCE_MS") {
            if let Ok(v) = ms.parse() {
                config.debounce_ms = v;
            }
        }

        if let Some(ms) = get_env_with_prefix("IDLE_TICK_INTERVAL_MS") {
            if let Ok(v) = ms.parse() {
                config.tick_interval_ms = v;
            }
        }

        config
    }

    /// Validate the configuration.
    ///
    /// The warning threshold must be strictly below the timeout so a warning
    /// state is always reachable before forced logout. A zero threshold is
    /// accepted: the warning and the logout then happen in the same
    /// recomputation, with the terminator still invoked exactly once.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(IdlewatchError::invalid_config(
                "timeout_ms must be positive",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(IdlewatchError::invalid_config(
                "tick_interval_ms must be positive",
            ));
        }
        if self.warning_threshold_ms >= self.timeout_ms {
            return Err(IdlewatchError::invalid_config(format!(
                "warning_threshold_ms ({}) must be below timeout_ms ({})",
                self.warning_threshold_ms, self.timeout_ms
            )));
        }
        Ok(())
    }

    /// Get the inactivity timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the warning threshold as a Duration
    pub fn warning_threshold(&self) -> Duration {
        Duration::from_millis(self.warning_threshold_ms)
    }

    /// Get the activity debounce window as a Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get the recomputation tick interval as a Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Builder for MonitorConfig
#[must_use = "builder does nothing until you call build()"]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
        }
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.config.timeout_ms = duration.as_millis() as u64;
        self
    }

    pub fn warning_threshold_ms(mut self, ms: u64) -> Self {
        self.config.warning_threshold_ms = ms;
        self
    }

    pub fn warning_threshold(mut self, duration: Duration) -> Self {
        self.config.warning_threshold_ms = duration.as_millis() as u64;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn tick_interval_ms(mut self, ms: u64) -> Self {
        self.config.tick_interval_ms = ms;
        self
    }

    pub fn build(self) -> MonitorConfig {
        self.config
    }
}

impl Default for MonitorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_timeout_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_warning_threshold_ms() -> u64 {
    10_000 // 10 seconds
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_tick_interval_ms() -> u64 {
    1_000
}
