//! Environment overrides
//!
//! Parsing helpers for the `WP_*` configuration variables. Anything unset
//! or unparseable falls back to the caller's default, so a typo in the
//! environment degrades to defaults instead of failing startup.

use std::str::FromStr;

/// Parse an environment variable, falling back to `default`.
#[inline]
pub fn env_get<T: FromStr>(key: &str, default: T) -> T {
    env_get_opt(key).unwrap_or(default)
}

/// Parse an environment variable if it is set and well-formed.
#[inline]
pub fn env_get_opt<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_uses_default() {
        assert_eq!(env_get("WP_TEST_NOT_SET", 7usize), 7);
        assert_eq!(env_get_opt::<usize>("WP_TEST_NOT_SET"), None);
    }

    #[test]
    fn test_set_value_wins() {
        std::env::set_var("WP_TEST_RING", "4096");
        assert_eq!(env_get("WP_TEST_RING", 0usize), 4096);
        assert_eq!(env_get_opt("WP_TEST_RING"), Some(4096usize));
        std::env::remove_var("WP_TEST_RING");
    }

    #[test]
    fn test_garbage_falls_back() {
        std::env::set_var("WP_TEST_GARBAGE", "lots");
        assert_eq!(env_get("WP_TEST_GARBAGE", 16usize), 16);
        assert_eq!(env_get_opt::<usize>("WP_TEST_GARBAGE"), None);
        std::env::remove_var("WP_TEST_GARBAGE");
    }
}
