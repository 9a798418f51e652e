//! Steal-pressure stress driver
//!
//! Pushes every task onto worker 0 and lets the other workers earn their
//! keep by stealing. Reports throughput and the steal distribution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use workpool::{env_get, env_get_opt, Pool, PoolConfig, Task};

static COMPLETED: AtomicU64 = AtomicU64::new(0);

fn spin_work(_arg: *mut ()) -> isize {
    // A few hundred nanoseconds of fake work
    let mut acc = 0u64;
    for i in 0..200 {
        acc = acc.wrapping_mul(31).wrapping_add(i);
    }
    std::hint::black_box(acc);
    COMPLETED.fetch_add(1, Ordering::Relaxed);
    0
}

fn main() {
    println!("=== workpool Stress Test ===\n");

    let task_count: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .or_else(|| env_get_opt("WP_STRESS_TASKS"))
        .unwrap_or(100_000);
    let children: usize = env_get("WP_STRESS_CHILDREN", 7);

    // All tasks sit on one ring until drained or stolen, so the ring must
    // hold the whole burst.
    let config = PoolConfig::from_env()
        .child_workers(children)
        .ring_capacity(task_count + 1024);
    let pool = Pool::new(config).expect("failed to start pool");

    println!(
        "Submitting {} tasks to worker 0 ({} workers total)...",
        task_count,
        pool.worker_count()
    );

    let start = Instant::now();
    for _ in 0..task_count {
        pool.submit(0, Task::new(spin_work, std::ptr::null_mut()));
    }
    let submit_time = start.elapsed();

    pool.wait();
    let total_time = start.elapsed();

    println!("\n=== Results ===");
    println!(
        "Completed:  {}/{}",
        COMPLETED.load(Ordering::Relaxed),
        task_count
    );
    println!("Submit:     {:?}", submit_time);
    println!("Total:      {:?}", total_time);
    println!(
        "Throughput: {:.0} tasks/sec",
        task_count as f64 / total_time.as_secs_f64()
    );

    println!("\nPer-worker:");
    for i in 0..pool.worker_count() {
        let s = pool.stats(i);
        println!(
            "  w{:<2} executed {:>8} (stolen {:>8})",
            i, s.executed, s.stolen
        );
    }

    pool.shutdown();
    println!("\n=== Stress Test Complete ===");
}
