//! Error types for the workpool scheduler
//!
//! The pool has no recoverable error path at runtime: a full ring or a
//! broken ring invariant aborts the process. Recoverable errors exist only
//! at construction time.

use core::fmt;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while building a pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Configuration failed validation
    InvalidConfig(&'static str),

    /// Failed to spawn a worker thread
    SpawnFailed,
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
            PoolError::SpawnFailed => write!(f, "failed to spawn worker thread"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Push rejected because the ring already holds `capacity` tasks.
///
/// Surfaces the overflow condition below the fatal boundary so the policy
/// stays testable; the pool layer logs and aborts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingFull;

impl fmt::Display for RingFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task ring full")
    }
}

impl std::error::Error for RingFull {}
