//! # workpool-core
//!
//! Platform-agnostic core types for the workpool scheduler:
//!
//! - `Task`: the (function, argument) unit of work
//! - Error types
//! - Worker phase, accounting and the per-thread worker binding
//! - Environment variable helpers
//! - Context-aware logging macros

pub mod env;
pub mod error;
pub mod log;
pub mod state;
pub mod task;

pub use env::{env_get, env_get_opt};
pub use error::{PoolError, PoolResult, RingFull};
pub use log::LogLevel;
pub use state::{WorkerPhase, WorkerStats, WorkerStatsSnapshot};
pub use task::{Task, WorkFn};
