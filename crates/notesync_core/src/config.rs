//! Sync engine configuration.
//!
//! # Responsibility
//! - Hold tunables for debounce and cache expiry with documented defaults.
//! - Reject settings that would break coalescing or expiry.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Default quiet window before an edit is sent.
pub const DEFAULT_DEBOUNCE_WINDOW_MS: u64 = 1_000;
/// Default maximum cache age used for cold-start rendering (24 hours).
pub const DEFAULT_CACHE_MAX_AGE_MS: i64 = 24 * 60 * 60 * 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroDebounceWindow,
    NonPositiveCacheMaxAge(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDebounceWindow => write!(f, "debounce_window_ms must be greater than 0"),
            Self::NonPositiveCacheMaxAge(value) => {
                write!(f, "cache_max_age_ms must be positive, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Tunables for `SyncCoordinator` and `LocalCache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Idle interval after the last edit before the update is sent.
    pub debounce_window_ms: u64,
    /// Snapshots at least this old are ignored at cold start.
    pub cache_max_age_ms: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEFAULT_DEBOUNCE_WINDOW_MS,
            cache_max_age_ms: DEFAULT_CACHE_MAX_AGE_MS,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_window_ms == 0 {
            return Err(ConfigError::ZeroDebounceWindow);
        }
        if self.cache_max_age_ms <= 0 {
            return Err(ConfigError::NonPositiveCacheMaxAge(self.cache_max_age_ms));
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SyncConfig, DEFAULT_CACHE_MAX_AGE_MS};

    #[test]
    fn defaults_are_one_second_and_one_day() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce_window_ms, 1_000);
        assert_eq!(config.cache_max_age_ms, DEFAULT_CACHE_MAX_AGE_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_field_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"debounce_window_ms": 250}"#).expect("config should parse");
        assert_eq!(config.debounce_window_ms, 250);
        assert_eq!(config.cache_max_age_ms, DEFAULT_CACHE_MAX_AGE_MS);
    }

    #[test]
    fn validate_rejects_zero_window() {
        let config = SyncConfig {
            debounce_window_ms: 0,
            ..SyncConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDebounceWindow));
    }
}
