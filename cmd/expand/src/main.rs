//! Self-expanding workload driver
//!
//! Seeds a handful of root tasks; every task fans out by five onto its own
//! worker's ring until the pool has seen enough submissions, then the
//! workload drains. Runs two phases with an accounting reset in between.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use workpool::{Pool, PoolConfig, Task};

const EXPAND_LIMIT: u64 = 10_000;
const FAN_OUT: usize = 5;
const ROOT_TASKS: usize = 10;

static TICKET: AtomicU64 = AtomicU64::new(1);

fn little_work(arg: *mut ()) -> isize {
    let pool = unsafe { &*(arg as *const Pool) };

    // LCG nap keeps workers busy for an uneven few microseconds
    let ticket = TICKET.fetch_add(1, Ordering::Relaxed);
    let nap = ticket.wrapping_mul(1103515245).wrapping_add(12345) % 201;
    std::thread::sleep(Duration::from_micros(nap));

    if pool.tasks_submitted() < EXPAND_LIMIT {
        pool.submit_batch_here(&[Task::new(little_work, arg); FAN_OUT]);
    }
    0
}

fn main() {
    println!("=== workpool Expanding Workload ===\n");

    let config = PoolConfig::from_env().child_workers(12);
    let pool = Pool::new(config).expect("failed to start pool");
    println!(
        "Started pool with {} workers, rings of {}",
        pool.worker_count(),
        pool.config().ring_capacity
    );

    for phase in 1..=2 {
        let start = Instant::now();

        let arg = &pool as *const Pool as *mut ();
        pool.submit_batch(0, &[Task::new(little_work, arg); ROOT_TASKS]);
        pool.wait();

        println!(
            "\nphase {}: {} tasks in {:?}",
            phase,
            pool.tasks_completed(),
            start.elapsed()
        );
        for i in 0..pool.worker_count() {
            let s = pool.stats(i);
            println!(
                "  w{:<2} executed {:>6} (stolen {:>5}), parks {:>4}",
                i, s.executed, s.stolen, s.parks
            );
        }

        // Next phase's accounting starts from zero
        pool.reset_accounting();
    }

    pool.shutdown();
    println!("\n=== Expanding Workload Complete ===");
}
