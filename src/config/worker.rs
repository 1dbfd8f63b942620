//! Scheduled cleanup configuration.
//!
//! # Example
//!
//! ```toml
//! [worker]
//! enabled = true
//! interval_secs = 900
//! dry_run = false
//! ```

use serde::{Deserialize, Serialize};

/// Scheduled cleanup configuration.
///
/// When enabled, the worker runs a cleanup pass every `interval_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Whether the scheduled worker runs.
    /// Default: false (must be explicitly enabled)
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between the end of one pass and the start of the next.
    /// Default: 900 (15 minutes)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// If true, log what would be deleted without deleting anything.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            dry_run: false,
        }
    }
}

fn default_interval_secs() -> u64 {
    900
}

impl WorkerConfig {
    /// Get the interval as a Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.interval_secs == 0 {
            return Err("worker: `interval_secs` must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert!(!config.enabled);
        assert!(!config.dry_run);
        assert_eq!(config.interval(), std::time::Duration::from_secs(900));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config: WorkerConfig = toml::from_str("interval_secs = 0").unwrap();
        assert!(config.validate().is_err());
    }
}
