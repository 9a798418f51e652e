//! Basic workpool example
//!
//! Seeds a batch of leaf tasks across the rings and waits for quiescence.

use std::sync::atomic::{AtomicU64, Ordering};
use workpool::{Pool, PoolConfig, Task};

static COMPLETED: AtomicU64 = AtomicU64::new(0);

fn little_work(arg: *mut ()) -> isize {
    let value = arg as usize;
    COMPLETED.fetch_add(1, Ordering::Relaxed);
    value as isize
}

fn main() {
    println!("=== workpool Basic Example ===\n");

    let config = PoolConfig::from_env().child_workers(3);
    let pool = Pool::new(config).expect("failed to start pool");
    println!("Started pool with {} workers", pool.worker_count());

    let task_count = 10;
    for i in 0..task_count {
        // The argument rides along as a plain value here
        pool.submit(
            i % pool.worker_count(),
            Task::new(little_work, (i + 1) as *mut ()),
        );
    }

    pool.wait();

    println!(
        "Completed: {}/{}",
        COMPLETED.load(Ordering::Relaxed),
        task_count
    );
    println!(
        "Accounting: {} submitted, {} completed",
        pool.tasks_submitted(),
        pool.tasks_completed()
    );

    pool.shutdown();
    println!("\n=== Example Complete ===");
}
