//! Worker drain + steal loop
//!
//! Each child worker repeats: drain its own ring, then steal from peers
//! while pending work exists anywhere, then park. The host worker (index 0)
//! runs only the drain part, inside the pool's wait barrier.

use crate::pool::PoolShared;
use crate::ring::TaskRing;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use workpool_core::state::{
    bind_current_worker, unbind_current_worker, WorkerPhase, WorkerStats,
};
use workpool_core::{wdebug, wtrace};

/// One worker's shared slot: its ring and its observable counters.
/// Index 0 belongs to the host thread and has no OS thread behind it.
pub(crate) struct WorkerSlot {
    pub index: usize,
    pub ring: TaskRing,
    pub stats: WorkerStats,
}

impl WorkerSlot {
    pub(crate) fn new(index: usize, ring_capacity: usize) -> Self {
        Self {
            index,
            ring: TaskRing::new(ring_capacity),
            stats: WorkerStats::new(),
        }
    }
}

/// Current OS thread id, for the observable stats.
pub(crate) fn os_thread_id() -> u64 {
    #[cfg(unix)]
    {
        unsafe { libc::pthread_self() as u64 }
    }
    #[cfg(not(unix))]
    {
        0
    }
}

/// Drain the worker's own ring, executing tasks in push order.
///
/// The ring lock is released before each task body runs, so task bodies
/// may submit freely. Returns the number of tasks executed.
pub(crate) fn drain_own_ring(shared: &PoolShared, slot: &WorkerSlot) -> u64 {
    let mut finished = 0u64;
    while let Some(task) = slot.ring.pop() {
        let status = task.run();
        shared.tasks_completed.fetch_add(1, Ordering::AcqRel);
        slot.stats.executed.fetch_add(1, Ordering::Relaxed);
        finished += 1;
        if status != 0 {
            wtrace!("task returned status {}", status);
        }
    }
    finished
}

/// Entry point for child worker threads (index >= 1).
pub(crate) fn worker_main(shared: Arc<PoolShared>, index: usize) {
    bind_current_worker(index);
    let me = &shared.workers[index];
    me.stats.thread_id.store(os_thread_id(), Ordering::Relaxed);

    if let Some(hook) = shared.config.on_thread_start {
        hook(index);
    }
    wdebug!("worker started");

    'run: loop {
        if !shared.running.load(Ordering::Acquire) {
            break;
        }

        // Work through our own queue first.
        me.stats.set_phase(WorkerPhase::Draining);
        let finished = drain_own_ring(&shared, me);
        if finished > 0 && shared.is_quiescent() {
            // Wake the external waiter
            shared.parking.wake_all();
        }

        // If there's still work somewhere and we don't have it, steal it.
        // Round-robin scan starting just past ourselves, so simultaneous
        // idlers fan out over different victims.
        if shared.has_pending() && me.ring.is_empty() {
            me.stats.set_phase(WorkerPhase::Stealing);
            let count = shared.workers.len();
            for step in 1..count {
                if shared.is_quiescent() {
                    break;
                }

                let victim = &shared.workers[(index + step) % count];
                if victim.ring.is_empty() {
                    continue;
                }

                // Never block on a peer's lock; a busy victim just means
                // its owner is draining it anyway.
                let Some(task) = victim.ring.try_steal() else {
                    continue;
                };
                wtrace!("stole task from w{}", victim.index);

                me.stats.set_phase(WorkerPhase::Draining);
                let status = task.run();
                shared.tasks_completed.fetch_add(1, Ordering::AcqRel);
                me.stats.executed.fetch_add(1, Ordering::Relaxed);
                me.stats.stolen.fetch_add(1, Ordering::Relaxed);
                if status != 0 {
                    wtrace!("task returned status {}", status);
                }

                if shared.is_quiescent() {
                    shared.parking.wake_all();
                }

                // Re-check our own queue before stealing again: the task
                // may have submitted local work, and local work has
                // priority.
                continue 'run;
            }
        }

        // All our work is done and there's nothing to steal: sleep until
        // a submission or shutdown wakes us.
        me.stats.set_phase(WorkerPhase::Parked);
        me.stats.parks.fetch_add(1, Ordering::Relaxed);
        shared.parking.park(shared.config.park_timeout_opt());
    }

    me.stats.set_phase(WorkerPhase::Exiting);
    wdebug!("worker exiting");

    if let Some(hook) = shared.config.on_thread_exit {
        hook(index);
    }
    unbind_current_worker();
}
