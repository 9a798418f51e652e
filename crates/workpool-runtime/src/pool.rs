//! Pool lifecycle, submission API and wait barrier
//!
//! A pool owns `child_workers + 1` workers. Worker 0 is the host: it is
//! bound to the thread that constructed the pool and has no OS thread of
//! its own; the host drains its ring inside [`Pool::wait`]. Workers 1..N
//! run the drain + steal loop on dedicated threads.
//!
//! Accounting: `tasks_submitted` is incremented under the target ring's
//! lock, strictly after the slot write; `tasks_completed` strictly after a
//! task body returns. `completed == submitted` with no in-flight
//! submissions is quiescence, the condition [`Pool::wait`] blocks on.

use crate::config::PoolConfig;
use crate::parking::{new_parking, WorkerParking};
use crate::worker::{drain_own_ring, os_thread_id, worker_main, WorkerSlot};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use workpool_core::state::{
    bind_current_worker, current_worker, WorkerPhase, WorkerStatsSnapshot,
};
use workpool_core::task::Task;
use workpool_core::{wdebug, werror, wtrace, PoolError, PoolResult};

/// State shared between the pool handle and all worker threads.
pub(crate) struct PoolShared {
    /// All workers; index 0 is the host
    pub workers: Box<[WorkerSlot]>,

    /// True from construction until shutdown begins
    pub running: AtomicBool,

    /// Total tasks ever pushed (or since the last accounting reset)
    pub tasks_submitted: AtomicU64,

    /// Total tasks whose body has returned
    pub tasks_completed: AtomicU64,

    /// Shared sleep/wake point for idle workers and the external waiter
    pub parking: Box<dyn WorkerParking>,

    pub config: PoolConfig,
}

impl PoolShared {
    /// True when every submitted task has completed.
    ///
    /// Completed is read first: seeing `completed == submitted` then
    /// implies all tasks counted in `submitted` have run.
    #[inline]
    pub(crate) fn is_quiescent(&self) -> bool {
        let completed = self.tasks_completed.load(Ordering::Acquire);
        let submitted = self.tasks_submitted.load(Ordering::Acquire);
        completed == submitted
    }

    /// True when some submitted task has not completed yet.
    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        let completed = self.tasks_completed.load(Ordering::Acquire);
        let submitted = self.tasks_submitted.load(Ordering::Acquire);
        completed < submitted
    }
}

/// Fixed-size work-stealing worker pool.
///
/// Tasks pushed onto one ring run in push order only as long as just the
/// owning worker pops them; thieves take from the same end concurrently,
/// so there is no global execution order.
///
/// The constructing thread becomes the host worker and is the thread that
/// should call [`Pool::wait`]; constructing a second pool on the same
/// thread rebinds it.
pub struct Pool {
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
}

impl Pool {
    /// Build the pool and start its child worker threads.
    ///
    /// The calling thread is bound as worker 0.
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let count = config.child_workers + 1;
        let workers: Box<[WorkerSlot]> = (0..count)
            .map(|i| WorkerSlot::new(i, config.ring_capacity))
            .collect();

        let shared = Arc::new(PoolShared {
            workers,
            running: AtomicBool::new(true),
            tasks_submitted: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            parking: new_parking(),
            config,
        });

        bind_current_worker(0);
        shared.workers[0]
            .stats
            .thread_id
            .store(os_thread_id(), Ordering::Relaxed);

        let mut handles = Vec::with_capacity(count - 1);
        for index in 1..count {
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("workpool-worker-{}", index))
                .spawn(move || worker_main(worker_shared, index));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    werror!("failed to spawn worker {}: {}", index, err);
                    // Roll back the workers already running
                    shared.running.store(false, Ordering::SeqCst);
                    for handle in handles {
                        shared.parking.wake_all();
                        let _ = handle.join();
                    }
                    return Err(PoolError::SpawnFailed);
                }
            }
        }

        wdebug!("pool started with {} workers", count);
        Ok(Self { shared, handles })
    }

    /// Push one task onto the named worker's ring.
    ///
    /// Any index below [`Pool::worker_count`] is valid, including the
    /// submitter's own; out of range panics. A full ring is a fatal
    /// overflow: the workload must keep in-flight tasks per worker within
    /// ring capacity.
    pub fn submit(&self, worker: usize, task: Task) {
        self.submit_batch(worker, &[task]);
    }

    /// Push a batch onto the named worker's ring, holding its lock once
    /// and waking sleepers once.
    pub fn submit_batch(&self, worker: usize, tasks: &[Task]) {
        if tasks.is_empty() {
            return;
        }

        let slot = &self.shared.workers[worker];
        {
            let mut buf = slot.ring.lock();
            for &task in tasks {
                if buf.push(task).is_err() {
                    werror!(
                        "ring overflow on worker {} ({} tasks queued)",
                        worker,
                        slot.ring.capacity()
                    );
                    std::process::abort();
                }
            }
            // Counted under the ring lock, after the slot writes: a thief
            // can only pop a task whose submission is already visible in
            // the counter.
            self.shared
                .tasks_submitted
                .fetch_add(tasks.len() as u64, Ordering::AcqRel);
            slot.ring.publish_len(&buf);
        }

        // Unconditional: the submitter cannot cheaply know whether anyone
        // is parked.
        self.shared.parking.wake_all();
    }

    /// Push one task onto the current worker's ring, or worker 0 when the
    /// calling thread is not bound to this pool.
    pub fn submit_here(&self, task: Task) {
        self.submit(self.here(), task);
    }

    /// Batch variant of [`Pool::submit_here`].
    pub fn submit_batch_here(&self, tasks: &[Task]) {
        self.submit_batch(self.here(), tasks);
    }

    fn here(&self) -> usize {
        match current_worker() {
            Some(index) if index < self.shared.workers.len() => index,
            _ => 0,
        }
    }

    /// Block until every submitted task has completed.
    ///
    /// Behaves as a cooperative worker: drains the host ring, then parks
    /// until a completion or submission wakes it. Call from the host
    /// thread.
    pub fn wait(&self) {
        let host = &self.shared.workers[0];

        loop {
            host.stats.set_phase(WorkerPhase::Draining);
            let finished = drain_own_ring(&self.shared, host);
            if finished > 0 {
                wtrace!("host drained {} tasks", finished);
            }

            if self.shared.is_quiescent() {
                break;
            }

            host.stats.set_phase(WorkerPhase::Parked);
            host.stats.parks.fetch_add(1, Ordering::Relaxed);
            // Always bounded, even when workers park forever: a child
            // racing its own park can consume the quiescence wake first,
            // and the barrier must still notice.
            let timeout = self
                .shared
                .config
                .park_timeout_opt()
                .unwrap_or(Duration::from_millis(10));
            self.shared.parking.park(Some(timeout));
        }

        host.stats.set_phase(WorkerPhase::Parked);
    }

    /// Zero both accounting counters.
    ///
    /// Only safe while the pool is quiescent, which [`Pool::wait`]
    /// guarantees; the next phase's accounting then starts from zero.
    pub fn reset_accounting(&self) {
        debug_assert!(self.shared.is_quiescent());
        self.shared.tasks_submitted.store(0, Ordering::SeqCst);
        self.shared.tasks_completed.store(0, Ordering::SeqCst);
    }

    /// Stop the workers and join their threads.
    ///
    /// Pending tasks that no worker has started are dropped; call
    /// [`Pool::wait`] first to run everything out.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return;
        }
        wdebug!("pool shutting down");

        for handle in self.handles.drain(..) {
            // Broadcast until the worker notices the stop: a worker that
            // parked just after a peer consumed an earlier broadcast's
            // pending wake would otherwise sleep through the join.
            while !handle.is_finished() {
                self.shared.parking.wake_all();
                thread::sleep(Duration::from_millis(1));
            }
            let _ = handle.join();
        }
    }

    // Observability

    /// Total workers, host included.
    pub fn worker_count(&self) -> usize {
        self.shared.workers.len()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn tasks_submitted(&self) -> u64 {
        self.shared.tasks_submitted.load(Ordering::Acquire)
    }

    pub fn tasks_completed(&self) -> u64 {
        self.shared.tasks_completed.load(Ordering::Acquire)
    }

    /// Queued-task hint for one worker's ring.
    pub fn queued_tasks(&self, worker: usize) -> u64 {
        self.shared.workers[worker].ring.len()
    }

    /// Snapshot of one worker's counters.
    pub fn stats(&self, worker: usize) -> WorkerStatsSnapshot {
        self.shared.workers[worker].stats.snapshot()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn count_up(arg: *mut ()) -> isize {
        let counter = unsafe { &*(arg as *const AtomicU64) };
        counter.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn slow_count_up(arg: *mut ()) -> isize {
        std::thread::sleep(Duration::from_micros(500));
        count_up(arg)
    }

    fn nop(_arg: *mut ()) -> isize {
        0
    }

    fn test_config(children: usize) -> PoolConfig {
        PoolConfig::new().child_workers(children)
    }

    #[test]
    fn test_wait_on_empty_pool_returns_immediately() {
        let pool = Pool::new(test_config(4)).unwrap();
        pool.wait();
        assert_eq!(pool.tasks_submitted(), 0);
        assert_eq!(pool.tasks_completed(), 0);
    }

    #[test]
    fn test_ten_leaf_tasks_all_run() {
        let pool = Pool::new(test_config(3)).unwrap();
        let counter = AtomicU64::new(0);

        for _ in 0..10 {
            pool.submit(0, Task::new(count_up, &counter as *const _ as *mut ()));
        }
        pool.wait();

        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert_eq!(pool.tasks_submitted(), 10);
        assert_eq!(pool.tasks_completed(), 10);
    }

    #[test]
    fn test_submit_spreads_over_workers() {
        let pool = Pool::new(test_config(3)).unwrap();
        let counter = AtomicU64::new(0);
        let task = Task::new(count_up, &counter as *const _ as *mut ());

        for i in 0..100 {
            pool.submit(i % pool.worker_count(), task);
        }
        pool.wait();

        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    struct ExpandCtx {
        pool: *const Pool,
        hits: AtomicU64,
    }

    fn expanding(arg: *mut ()) -> isize {
        let ctx = unsafe { &*(arg as *const ExpandCtx) };
        let pool = unsafe { &*ctx.pool };
        ctx.hits.fetch_add(1, Ordering::SeqCst);

        if pool.tasks_submitted() < 10_000 {
            let task = Task::new(expanding, arg);
            pool.submit_batch_here(&[task; 5]);
        }
        0
    }

    #[test]
    fn test_expanding_workload_terminates() {
        let pool = Pool::new(test_config(4)).unwrap();
        let ctx = ExpandCtx {
            pool: &pool,
            hits: AtomicU64::new(0),
        };
        let arg = &ctx as *const ExpandCtx as *mut ();

        pool.submit_batch(0, &[Task::new(expanding, arg); 10]);
        pool.wait();

        assert_eq!(pool.tasks_submitted(), pool.tasks_completed());
        assert!(pool.tasks_submitted() >= 10_000);
        assert_eq!(ctx.hits.load(Ordering::SeqCst), pool.tasks_completed());
    }

    #[test]
    fn test_reset_accounting_between_phases() {
        let pool = Pool::new(test_config(3)).unwrap();
        let counter = AtomicU64::new(0);
        let task = Task::new(count_up, &counter as *const _ as *mut ());

        for _ in 0..10 {
            pool.submit(0, task);
        }
        pool.wait();
        assert_eq!(pool.tasks_completed(), 10);

        pool.reset_accounting();
        assert_eq!(pool.tasks_submitted(), 0);
        assert_eq!(pool.tasks_completed(), 0);

        // Reset followed by wait with no submissions returns immediately
        pool.wait();

        for _ in 0..10 {
            pool.submit(1, task);
        }
        pool.wait();

        assert_eq!(pool.tasks_completed(), 10);
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_peers_steal_from_single_producer() {
        let pool = Pool::new(test_config(7)).unwrap();
        let counter = AtomicU64::new(0);
        let task = Task::new(slow_count_up, &counter as *const _ as *mut ());

        // Everything lands on worker 0; peers only get work by stealing
        for _ in 0..2000 {
            pool.submit(0, task);
        }
        pool.wait();

        assert_eq!(counter.load(Ordering::SeqCst), 2000);

        let mut total = 0;
        let mut stolen = 0;
        for i in 0..pool.worker_count() {
            let snap = pool.stats(i);
            total += snap.executed;
            stolen += snap.stolen;
            if i >= 1 {
                assert!(snap.executed >= 1, "worker {} never ran a task", i);
            }
        }
        assert_eq!(total, 2000);
        assert!(stolen >= 1);
    }

    #[test]
    fn test_shutdown_joins_after_work() {
        let pool = Pool::new(test_config(3)).unwrap();
        let counter = AtomicU64::new(0);

        for _ in 0..10 {
            pool.submit(0, Task::new(count_up, &counter as *const _ as *mut ()));
        }
        pool.wait();
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_init_destroy_without_work() {
        let pool = Pool::new(test_config(4)).unwrap();
        assert!(pool.is_running());
        assert_eq!(pool.worker_count(), 5);
        drop(pool);
    }

    #[test]
    fn test_ring_capacity_fill_is_legal() {
        // Host-only pool: nothing drains until wait()
        let config = PoolConfig::new().child_workers(0).ring_capacity(64);
        let pool = Pool::new(config).unwrap();
        let counter = AtomicU64::new(0);
        let task = Task::new(count_up, &counter as *const _ as *mut ());

        for _ in 0..64 {
            pool.submit(0, task);
        }
        assert_eq!(pool.queued_tasks(0), 64);

        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 64);
        assert_eq!(pool.queued_tasks(0), 0);
    }

    #[test]
    fn test_submit_here_from_foreign_thread_targets_host() {
        let config = PoolConfig::new().child_workers(0);
        let pool = Pool::new(config).unwrap();
        let counter = AtomicU64::new(0);

        thread::scope(|s| {
            s.spawn(|| {
                // This thread has no worker binding
                pool.submit_here(Task::new(count_up, &counter as *const _ as *mut ()));
            });
        });

        assert_eq!(pool.queued_tasks(0), 1);
        pool.wait();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[should_panic]
    fn test_submit_out_of_range_panics() {
        let pool = Pool::new(test_config(0)).unwrap();
        pool.submit(5, Task::new(nop, std::ptr::null_mut()));
    }

    static HOOK_STARTS: AtomicU64 = AtomicU64::new(0);
    static HOOK_EXITS: AtomicU64 = AtomicU64::new(0);

    fn on_start(_worker: usize) {
        HOOK_STARTS.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exit(_worker: usize) {
        HOOK_EXITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_thread_hooks_fire_per_child() {
        let config = test_config(3)
            .on_thread_start(on_start)
            .on_thread_exit(on_exit);
        let pool = Pool::new(config).unwrap();
        pool.shutdown();

        // Children only; the host thread was not started by the pool
        assert_eq!(HOOK_STARTS.load(Ordering::SeqCst), 3);
        assert_eq!(HOOK_EXITS.load(Ordering::SeqCst), 3);
    }
}
