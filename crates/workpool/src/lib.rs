//! # workpool - Work-Stealing Worker Pool
//!
//! A fixed-size pool of long-lived worker threads executing short-lived,
//! independently scheduled tasks. Tasks can submit more tasks, so the
//! workload is dynamic.
//!
//! ## Features
//!
//! - **Per-worker bounded rings**: each worker owns a fixed-capacity FIFO;
//!   monotonic 64-bit counters index the slots
//! - **Work stealing**: idle workers scan peers round-robin and pop from
//!   them with non-blocking lock attempts
//! - **Park/wake**: idle workers sleep on a futex (Linux) or condvar;
//!   every submission broadcasts, and no wake racing a park is lost
//! - **Wait barrier**: the host thread drains its own ring cooperatively
//!   until every submitted task has completed
//! - **Dynamic workloads**: task bodies may submit onto any ring,
//!   including their own
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use workpool::{init, Task};
//!
//! fn hello(arg: *mut ()) -> isize {
//!     let counter = unsafe { &*(arg as *const AtomicU64) };
//!     counter.fetch_add(1, Ordering::Relaxed);
//!     0
//! }
//!
//! fn main() {
//!     // Host worker plus 7 child threads
//!     let pool = init(7).unwrap();
//!
//!     static COUNTER: AtomicU64 = AtomicU64::new(0);
//!     for i in 0..100 {
//!         pool.submit(
//!             i % pool.worker_count(),
//!             Task::new(hello, &COUNTER as *const AtomicU64 as *mut ()),
//!         );
//!     }
//!
//!     pool.wait();
//!     assert_eq!(COUNTER.load(Ordering::Relaxed), 100);
//!
//!     pool.shutdown();
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Host thread                         │
//! │        submit(), wait() — drives worker 0's ring        │
//! └─────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                         Pool                            │
//! │   submitted/completed counters, running flag, parking   │
//! └─────────────────────────────────────────────────────────┘
//!           │                 │                 │
//!           ▼                 ▼                 ▼
//!     ┌───────────┐     ┌───────────┐     ┌───────────┐
//!     │  Worker 1 │     │  Worker 2 │     │  Worker N │
//!     │ ring+loop │◄───►│ ring+loop │◄───►│ ring+loop │
//!     └───────────┘     └───────────┘     └───────────┘
//!                      (steal round-robin)
//! ```
//!
//! ## Ordering caveat
//!
//! Tasks on one ring run in push order only while the owning worker alone
//! pops them. A thief pops from the same end concurrently, so there is no
//! global FIFO across the pool. Do not depend on cross-worker ordering.

// Re-export core types
pub use workpool_core::{
    PoolError, PoolResult, RingFull, Task, WorkFn, WorkerPhase, WorkerStatsSnapshot,
};

// Re-export logging macros and controls
pub use workpool_core::log::{set_level as set_log_level, LogLevel};
pub use workpool_core::{wdebug, werror, winfo, wtrace, wwarn};

// Re-export env utilities
pub use workpool_core::{env_get, env_get_opt};

// Re-export runtime types
pub use workpool_runtime::{Pool, PoolConfig, ThreadHook};

/// Build a pool with `child_workers` threads beyond the host, using
/// defaults plus environment overrides for everything else.
///
/// The calling thread becomes the host worker (index 0).
pub fn init(child_workers: usize) -> PoolResult<Pool> {
    Pool::new(PoolConfig::from_env().child_workers(child_workers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn count_up(arg: *mut ()) -> isize {
        let counter = unsafe { &*(arg as *const AtomicU64) };
        counter.fetch_add(1, Ordering::SeqCst);
        0
    }

    #[test]
    fn test_init_and_run() {
        let pool = init(2).unwrap();
        assert_eq!(pool.worker_count(), 3);

        let counter = AtomicU64::new(0);
        for _ in 0..50 {
            pool.submit_here(Task::new(count_up, &counter as *const _ as *mut ()));
        }
        pool.wait();

        assert_eq!(counter.load(Ordering::SeqCst), 50);
        pool.shutdown();
    }
}
