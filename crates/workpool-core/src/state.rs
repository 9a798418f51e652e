//! Worker phase, per-worker accounting and the per-thread worker binding

use core::fmt;
use core::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::cell::Cell;

thread_local! {
    /// Worker index driven by this OS thread, `usize::MAX` when unbound
    static CURRENT_WORKER: Cell<usize> = const { Cell::new(usize::MAX) };
}

/// Bind this thread to a worker index.
///
/// Set once on entry - children when their thread starts, the host at
/// pool construction - and stable for the thread's lifetime. Routing
/// (submit-to-own-ring) and log context both read this binding.
pub fn bind_current_worker(index: usize) {
    CURRENT_WORKER.with(|cell| cell.set(index));
}

/// Clear the binding (thread leaving the pool).
pub fn unbind_current_worker() {
    CURRENT_WORKER.with(|cell| cell.set(usize::MAX));
}

/// Worker index bound to this thread, if any.
#[inline]
pub fn current_worker() -> Option<usize> {
    let index = CURRENT_WORKER.with(|cell| cell.get());
    if index == usize::MAX {
        None
    } else {
        Some(index)
    }
}

/// Phase of a worker's drain/steal loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerPhase {
    /// Popping and executing tasks from its own ring
    Draining = 0,

    /// Own ring empty, scanning peers for work
    Stealing = 1,

    /// No work anywhere, sleeping until woken
    Parked = 2,

    /// Observed shutdown, about to return
    Exiting = 3,
}

impl WorkerPhase {
    /// Check if the worker is making progress on tasks
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, WorkerPhase::Draining | WorkerPhase::Stealing)
    }

    /// Check if the worker has left its loop for good
    #[inline]
    pub const fn is_terminated(&self) -> bool {
        matches!(self, WorkerPhase::Exiting)
    }
}

impl From<u8> for WorkerPhase {
    fn from(v: u8) -> Self {
        match v {
            0 => WorkerPhase::Draining,
            1 => WorkerPhase::Stealing,
            2 => WorkerPhase::Parked,
            _ => WorkerPhase::Exiting,
        }
    }
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerPhase::Draining => "draining",
            WorkerPhase::Stealing => "stealing",
            WorkerPhase::Parked => "parked",
            WorkerPhase::Exiting => "exiting",
        };
        f.write_str(s)
    }
}

/// Per-worker counters, all atomic so any thread can observe them.
///
/// Cache-line aligned: one worker writes, peers and the host only read.
#[repr(align(64))]
pub struct WorkerStats {
    /// Current loop phase
    phase: AtomicU8,

    /// Tasks executed by this worker
    pub executed: AtomicU64,

    /// Of those, taken from a peer's ring
    pub stolen: AtomicU64,

    /// Times the worker went to sleep
    pub parks: AtomicU64,

    /// OS thread ID (pthread_t on Unix), 0 for the host before binding
    pub thread_id: AtomicU64,
}

impl WorkerStats {
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(WorkerPhase::Parked as u8),
            executed: AtomicU64::new(0),
            stolen: AtomicU64::new(0),
            parks: AtomicU64::new(0),
            thread_id: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn set_phase(&self, phase: WorkerPhase) {
        self.phase.store(phase as u8, Ordering::Relaxed);
    }

    #[inline]
    pub fn phase(&self) -> WorkerPhase {
        WorkerPhase::from(self.phase.load(Ordering::Relaxed))
    }

    /// Plain-value snapshot for reporting
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            phase: self.phase(),
            executed: self.executed.load(Ordering::Relaxed),
            stolen: self.stolen.load(Ordering::Relaxed),
            parks: self.parks.load(Ordering::Relaxed),
        }
    }
}

impl Default for WorkerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of a worker's counters
#[derive(Debug, Clone, Copy)]
pub struct WorkerStatsSnapshot {
    pub phase: WorkerPhase,
    pub executed: u64,
    pub stolen: u64,
    pub parks: u64,
}
