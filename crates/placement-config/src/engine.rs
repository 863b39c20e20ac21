//! Workflow engine tuning: conflict retries and the attention threshold.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_max_attempts() -> u32 {
    4
}

const fn default_base_delay_ms() -> u64 {
    25
}

const fn default_max_delay_ms() -> u64 {
    1_000
}

const fn default_attention_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Attempts per operation when a write conflict is detected (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff cap, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Days in `t.approved` / `doc.approved` before a record needs attention.
    #[serde(default = "default_attention_days")]
    pub attention_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            attention_days: default_attention_days(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Reject settings the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `max_attempts` is zero or the
    /// base delay exceeds the cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "engine.base_delay_ms".into(),
                reason: format!("exceeds engine.max_delay_ms ({})", self.max_delay_ms),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.attention_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = EngineConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "engine.max_attempts"
        ));
    }

    #[test]
    fn base_delay_above_cap_rejected() {
        let config = EngineConfig {
            base_delay_ms: 5_000,
            max_delay_ms: 100,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
