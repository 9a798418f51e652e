//! # workpool-runtime
//!
//! The pool itself:
//!
//! - Per-worker bounded task rings
//! - Worker threads with the drain + steal loop
//! - Park/wake coordination for idle workers and the external waiter
//! - Pool lifecycle, submission API and the completion-wait barrier
//! - Configuration with environment overrides

pub mod config;
pub mod parking;
pub mod pool;
pub mod ring;

mod worker;

// Re-exports
pub use config::{PoolConfig, ThreadHook};
pub use parking::{new_parking, WorkerParking};
pub use pool::Pool;
pub use ring::TaskRing;
