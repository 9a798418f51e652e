//! Pool configuration
//!
//! Compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder methods (programmatic)
//! 2. Environment variables (runtime)
//! 3. Library defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use workpool_runtime::config::PoolConfig;
//!
//! // Use defaults with env overrides
//! let config = PoolConfig::from_env();
//!
//! // Or customize programmatically
//! let config = PoolConfig::from_env()
//!     .child_workers(7)
//!     .ring_capacity(4096);
//! ```

pub mod defaults;

use std::time::Duration;
use workpool_core::env::env_get;
use workpool_core::error::{PoolError, PoolResult};

/// Callback invoked with the worker index at child-thread entry or exit.
///
/// Intended for profiler integration; no-op when unset. The host thread
/// never runs these - it was not started by the pool.
pub type ThreadHook = fn(usize);

/// Pool configuration with builder pattern.
///
/// Use `from_env()` to start with compile-time defaults and apply any
/// environment variable overrides.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Worker threads beyond the host (total workers = child_workers + 1)
    pub child_workers: usize,
    /// Per-worker ring capacity, in tasks
    pub ring_capacity: usize,
    /// Upper bound on a single park; zero parks forever
    pub park_timeout: Duration,
    /// Invoked on each child thread after it binds its worker index
    pub on_thread_start: Option<ThreadHook>,
    /// Invoked on each child thread just before it returns
    pub on_thread_exit: Option<ThreadHook>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl PoolConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `WP_CHILD_WORKERS` - Worker threads beyond the host
    /// - `WP_RING_CAPACITY` - Per-worker ring capacity
    /// - `WP_PARK_TIMEOUT_MS` - Park timeout in milliseconds (0 = forever)
    pub fn from_env() -> Self {
        Self {
            child_workers: env_get("WP_CHILD_WORKERS", defaults::CHILD_WORKERS),
            ring_capacity: env_get("WP_RING_CAPACITY", defaults::RING_CAPACITY),
            park_timeout: Duration::from_millis(env_get(
                "WP_PARK_TIMEOUT_MS",
                defaults::PARK_TIMEOUT_MS,
            )),
            on_thread_start: None,
            on_thread_exit: None,
        }
    }

    /// Create config with explicit defaults (no env override).
    /// Useful for testing or when you want full control.
    pub fn new() -> Self {
        Self {
            child_workers: defaults::CHILD_WORKERS,
            ring_capacity: defaults::RING_CAPACITY,
            park_timeout: Duration::from_millis(defaults::PARK_TIMEOUT_MS),
            on_thread_start: None,
            on_thread_exit: None,
        }
    }

    // Builder methods

    pub fn child_workers(mut self, n: usize) -> Self {
        self.child_workers = n;
        self
    }

    pub fn ring_capacity(mut self, cap: usize) -> Self {
        self.ring_capacity = cap;
        self
    }

    pub fn park_timeout(mut self, d: Duration) -> Self {
        self.park_timeout = d;
        self
    }

    pub fn on_thread_start(mut self, hook: ThreadHook) -> Self {
        self.on_thread_start = Some(hook);
        self
    }

    pub fn on_thread_exit(mut self, hook: ThreadHook) -> Self {
        self.on_thread_exit = Some(hook);
        self
    }

    /// Park timeout as the parking layer expects it: `None` parks forever.
    pub(crate) fn park_timeout_opt(&self) -> Option<Duration> {
        if self.park_timeout.is_zero() {
            None
        } else {
            Some(self.park_timeout)
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> PoolResult<()> {
        if self.child_workers > 255 {
            return Err(PoolError::InvalidConfig("child_workers must be <= 255"));
        }
        if self.ring_capacity == 0 {
            return Err(PoolError::InvalidConfig("ring_capacity must be > 0"));
        }
        if self.ring_capacity > (1 << 30) {
            return Err(PoolError::InvalidConfig("ring_capacity must be <= 2^30"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        let config = PoolConfig::from_env();
        assert!(config.validate().is_ok());
        assert!(config.on_thread_start.is_none());
    }

    #[test]
    fn test_builder() {
        let config = PoolConfig::new()
            .child_workers(7)
            .ring_capacity(4096)
            .park_timeout(Duration::from_millis(5));

        assert_eq!(config.child_workers, 7);
        assert_eq!(config.ring_capacity, 4096);
        assert_eq!(config.park_timeout, Duration::from_millis(5));
    }

    #[test]
    fn test_validation() {
        let config = PoolConfig::new().child_workers(1000);
        assert!(config.validate().is_err());

        let config = PoolConfig::new().ring_capacity(0);
        assert!(config.validate().is_err());

        let config = PoolConfig::new().child_workers(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_park_timeout_opt() {
        let config = PoolConfig::new().park_timeout(Duration::ZERO);
        assert!(config.park_timeout_opt().is_none());

        let config = PoolConfig::new().park_timeout(Duration::from_millis(50));
        assert_eq!(config.park_timeout_opt(), Some(Duration::from_millis(50)));
    }
}
