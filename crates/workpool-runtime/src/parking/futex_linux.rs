//! Linux futex-based worker parking
//!
//! The futex word is a single pending-wake flag: `wake_*()` raises it
//! before waking, `park()` lowers it before sleeping and again after
//! waking. A wake that lands between a caller's work check and its park
//! is consumed at park entry instead of being lost, and because the flag
//! never stacks, a burst of wakes costs an idle thread at most one
//! wakeful loop before it actually sleeps.

use super::WorkerParking;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// Linux futex-based parking
pub struct FutexParking {
    /// Futex word: 1 while a wake is pending, else 0
    futex: AtomicU32,

    /// Count of parked threads
    parked: AtomicUsize,
}

impl FutexParking {
    pub fn new() -> Self {
        Self {
            futex: AtomicU32::new(0),
            parked: AtomicUsize::new(0),
        }
    }

    /// Lower the pending-wake flag, reporting whether it was raised.
    fn consume_wake(&self) -> bool {
        self.futex.swap(0, Ordering::AcqRel) != 0
    }

    fn futex_wait(&self, timeout: Option<Duration>) -> i64 {
        let timespec = timeout.map(|d| libc::timespec {
            tv_sec: d.as_secs() as libc::time_t,
            tv_nsec: d.subsec_nanos() as libc::c_long,
        });

        let timespec_ptr = match &timespec {
            Some(ts) => ts as *const libc::timespec,
            None => std::ptr::null(),
        };

        // Sleeps only while the flag is still down
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.futex.as_ptr(),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                0u32,
                timespec_ptr,
                std::ptr::null::<u32>(),
                0u32,
            ) as i64
        }
    }

    fn futex_wake(&self, count: i32) {
        unsafe {
            libc::syscall(
                libc::SYS_futex,
                self.futex.as_ptr(),
                libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
                count,
                std::ptr::null::<libc::timespec>(),
                std::ptr::null::<u32>(),
                0u32,
            );
        }
    }
}

impl Default for FutexParking {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerParking for FutexParking {
    fn park(&self, timeout: Option<Duration>) -> bool {
        // Fast path: a wake already arrived
        if self.consume_wake() {
            return true;
        }

        self.parked.fetch_add(1, Ordering::SeqCst);
        let result = self.futex_wait(timeout);
        self.parked.fetch_sub(1, Ordering::SeqCst);

        // Take the flag down whether we were woken, raced the raise
        // (EAGAIN) or timed out alongside one
        let consumed = self.consume_wake();
        consumed || result == 0
    }

    fn wake_one(&self) {
        self.futex.store(1, Ordering::Release);
        if self.parked.load(Ordering::Acquire) > 0 {
            self.futex_wake(1);
        }
    }

    fn wake_all(&self) {
        // Raise the flag first so a thread past its work check but not
        // yet asleep still observes this wake
        self.futex.store(1, Ordering::Release);
        if self.parked.load(Ordering::Acquire) > 0 {
            self.futex_wake(i32::MAX);
        }
    }

    fn parked_count(&self) -> usize {
        self.parked.load(Ordering::Relaxed)
    }
}

// Safety: FutexParking only contains atomics
unsafe impl Send for FutexParking {}
unsafe impl Sync for FutexParking {}
