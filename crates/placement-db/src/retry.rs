//! Write-contention classification and retry backoff.
//!
//! Every mutation runs under `BEGIN IMMEDIATE` with a busy timeout. When the
//! timeout expires, or the record's version guard misses, the attempt is a
//! conflict and the whole operation is replayed after an exponential delay.

use std::time::Duration;

use placement_config::EngineConfig;

/// Configuration for retry behavior on write conflicts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RetryConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }
}

impl RetryConfig {
    /// Delay before retrying after the given (1-based) failed attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Detect lock contention reported by `SQLite`.
///
/// `SQLITE_BUSY` after the busy timeout, `SQLITE_LOCKED` on shared-cache
/// tables, and a nested `BEGIN` on a shared in-memory connection all mean
/// another writer is active.
pub fn is_contention_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("database is busy")
        || msg.contains("cannot start a transaction within a transaction")
}

/// Detect UNIQUE constraint failures.
pub fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}
