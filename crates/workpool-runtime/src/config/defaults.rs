//! Compile-time configuration defaults

/// Worker threads beyond the host
pub const CHILD_WORKERS: usize = 3;

/// Per-worker ring capacity, in tasks
pub const RING_CAPACITY: usize = 16000;

/// Upper bound on a single park before re-checking for work, in
/// milliseconds. 0 parks forever.
pub const PARK_TIMEOUT_MS: u64 = 100;
