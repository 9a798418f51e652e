//! Worker parking mechanism
//!
//! Provides efficient sleep/wake for idle workers and the external waiter.
//! Platform-specific implementations use the most efficient primitive
//! available.

use std::time::Duration;

/// Platform-specific worker parking mechanism
///
/// Workers call `park()` when no work is available. Wake sources (submit,
/// quiescence, shutdown) call `wake_one()` or `wake_all()`.
///
/// A wake issued while nobody is parked is remembered as a single pending
/// flag consumed by the next park, so a wake that races a park attempt is
/// never lost. The flag does not stack: however many wakes arrive while a
/// thread is busy, its next park returns without sleeping at most once.
pub trait WorkerParking: Send + Sync {
    /// Park the current thread until signaled or timeout
    ///
    /// Returns:
    /// - `true` if woken by signal (or a pending wake was consumed)
    /// - `false` if timeout or spurious wakeup
    ///
    /// Callers must re-check for work after returning regardless of the
    /// return value.
    fn park(&self, timeout: Option<Duration>) -> bool;

    /// Wake one parked thread
    fn wake_one(&self);

    /// Wake all parked threads
    ///
    /// Used on every submission, on quiescence and for shutdown.
    fn wake_all(&self);

    /// Number of currently parked threads (hint, may be stale)
    fn parked_count(&self) -> usize;
}

// Platform-specific implementations
cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod futex_linux;
        pub use futex_linux::FutexParking as PlatformParking;
    } else {
        mod fallback;
        pub use fallback::CondvarParking as PlatformParking;
    }
}

/// Create a new platform-appropriate parking instance
pub fn new_parking() -> Box<dyn WorkerParking> {
    Box::new(PlatformParking::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_park_timeout() {
        let parking = new_parking();
        let start = std::time::Instant::now();
        let result = parking.park(Some(Duration::from_millis(50)));
        let elapsed = start.elapsed();

        assert!(!result || elapsed < Duration::from_millis(100));
        assert!(elapsed >= Duration::from_millis(40)); // Allow some slack
    }

    #[test]
    fn test_wake_all() {
        let parking = Arc::new(PlatformParking::new());
        let mut handles = Vec::new();

        for _ in 0..2 {
            let parking = Arc::clone(&parking);
            handles.push(thread::spawn(move || {
                parking.park(Some(Duration::from_secs(10)))
            }));
        }

        // Give threads time to park
        thread::sleep(Duration::from_millis(50));

        parking.wake_all();

        for h in handles {
            assert!(h.join().unwrap());
        }
    }

    #[test]
    fn test_wake_before_park_is_pending() {
        let parking = PlatformParking::new();

        // Nobody parked yet: the wake must not be lost
        parking.wake_all();

        let start = std::time::Instant::now();
        let result = parking.park(Some(Duration::from_secs(10)));
        assert!(result);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wake_one() {
        let parking = Arc::new(PlatformParking::new());
        let parking2 = Arc::clone(&parking);

        let handle = thread::spawn(move || parking2.park(Some(Duration::from_secs(10))));

        thread::sleep(Duration::from_millis(50));
        parking.wake_one();

        assert!(handle.join().unwrap());
    }
}
