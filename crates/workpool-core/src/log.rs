//! Leveled stderr logging with worker context
//!
//! Workers log through these macros so interleaved lines from a busy pool
//! say which worker wrote them:
//!
//! ```text
//! [DEBUG] [w2] stole task from w0
//! [INFO]  [w--] pool started with 8 workers
//! ```
//!
//! `w--` marks a thread with no worker binding. The verbosity threshold
//! comes from `WP_LOG_LEVEL` (off|error|warn|info|debug|trace, or 0..5;
//! default info), read once on first use; [`set_level`] overrides it at
//! runtime. The context is the per-thread worker binding kept in
//! [`crate::state`].

use crate::state;
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity threshold for the logging macros
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }
}

// u8::MAX marks "WP_LOG_LEVEL not read yet"
static LEVEL: AtomicU8 = AtomicU8::new(u8::MAX);

/// Current verbosity threshold, reading `WP_LOG_LEVEL` on first use.
pub fn level() -> LogLevel {
    let raw = LEVEL.load(Ordering::Relaxed);
    if raw != u8::MAX {
        return LogLevel::from_u8(raw);
    }
    let parsed = match std::env::var("WP_LOG_LEVEL") {
        Ok(value) => LogLevel::parse(&value),
        Err(_) => LogLevel::Info,
    };
    LEVEL.store(parsed as u8, Ordering::Relaxed);
    parsed
}

/// Override the threshold for the rest of the process.
pub fn set_level(new: LogLevel) {
    LEVEL.store(new as u8, Ordering::Relaxed);
}

/// Check whether lines at `wanted` currently print.
#[inline]
pub fn enabled(wanted: LogLevel) -> bool {
    wanted as u8 <= level() as u8
}

#[doc(hidden)]
pub fn _log(wanted: LogLevel, args: fmt::Arguments<'_>) {
    if !enabled(wanted) {
        return;
    }

    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = match state::current_worker() {
        Some(worker) => writeln!(out, "{} [w{}] {}", wanted.tag(), worker, args),
        None => writeln!(out, "{} [w--] {}", wanted.tag(), args),
    };
}

/// Error level log with worker context
#[macro_export]
macro_rules! werror {
    ($($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Error, format_args!($($arg)*))
    };
}

/// Warning level log with worker context
#[macro_export]
macro_rules! wwarn {
    ($($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Warn, format_args!($($arg)*))
    };
}

/// Info level log with worker context
#[macro_export]
macro_rules! winfo {
    ($($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Info, format_args!($($arg)*))
    };
}

/// Debug level log with worker context
#[macro_export]
macro_rules! wdebug {
    ($($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Debug, format_args!($($arg)*))
    };
}

/// Trace level log with worker context
#[macro_export]
macro_rules! wtrace {
    ($($arg:tt)*) => {
        $crate::log::_log($crate::log::LogLevel::Trace, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_digits() {
        assert_eq!(LogLevel::parse("trace"), LogLevel::Trace);
        assert_eq!(LogLevel::parse("OFF"), LogLevel::Off);
        assert_eq!(LogLevel::parse("2"), LogLevel::Warn);
        // Anything unrecognized lands on the default
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Info);
    }

    #[test]
    fn test_level_switching_and_macros() {
        // Single test for the global threshold so parallel tests don't
        // race each other's overrides
        set_level(LogLevel::Error);
        assert!(enabled(LogLevel::Error));
        assert!(!enabled(LogLevel::Info));

        set_level(LogLevel::Trace);
        assert!(enabled(LogLevel::Debug));

        // Suppress output, then exercise every macro
        set_level(LogLevel::Off);
        werror!("ring overflow on worker {}", 3);
        wwarn!("worker {} slow to exit", 1);
        winfo!("pool quiescent");
        wdebug!("drained {} tasks", 12);
        wtrace!("stole task from w{}", 0);
    }
}
