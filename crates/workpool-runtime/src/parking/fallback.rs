//! Fallback parking using std::sync::Condvar
//!
//! Used on platforms without futex support. The pending-wake flag lives
//! under the condvar's mutex and `park()` observes it under that same
//! mutex before waiting, so a wake that races a park attempt is consumed
//! at park entry instead of being lost. The flag never stacks: a burst of
//! wakes costs an idle thread at most one wakeful loop.

use super::WorkerParking;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Condvar-based parking (fallback)
pub struct CondvarParking {
    /// True while a wake is pending
    wake_pending: Mutex<bool>,

    /// Condition variable
    condvar: Condvar,

    /// Count of parked threads
    parked: AtomicUsize,
}

impl CondvarParking {
    pub fn new() -> Self {
        Self {
            wake_pending: Mutex::new(false),
            condvar: Condvar::new(),
            parked: AtomicUsize::new(0),
        }
    }
}

impl Default for CondvarParking {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerParking for CondvarParking {
    fn park(&self, timeout: Option<Duration>) -> bool {
        let mut pending = self.wake_pending.lock().unwrap();

        // Fast path: a wake already arrived
        if *pending {
            *pending = false;
            return true;
        }

        self.parked.fetch_add(1, Ordering::SeqCst);

        let woken = match timeout {
            Some(t) => {
                let (guard, timeout_result) = self.condvar.wait_timeout(pending, t).unwrap();
                pending = guard;
                !timeout_result.timed_out()
            }
            None => {
                pending = self.condvar.wait(pending).unwrap();
                true
            }
        };

        self.parked.fetch_sub(1, Ordering::SeqCst);

        // Take the flag down if a raise accompanied (or raced) the wake
        if *pending {
            *pending = false;
            return true;
        }
        woken
    }

    fn wake_one(&self) {
        *self.wake_pending.lock().unwrap() = true;
        self.condvar.notify_one();
    }

    fn wake_all(&self) {
        // Raised even with nobody parked, so a thread past its work
        // check but not yet asleep still observes this wake
        *self.wake_pending.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    fn parked_count(&self) -> usize {
        self.parked.load(Ordering::Relaxed)
    }
}
