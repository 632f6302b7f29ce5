//! Default configuration values shared between the library and the CLI
//!
//! These constants keep watcher defaults consistent across all entry points.

use std::time::Duration;

/// Default watch timeout in milliseconds
pub const DEFAULT_WATCH_TIMEOUT_MS: u64 = 30_000;

/// Default delay between watch attempts in milliseconds
pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 1_000;

/// Smallest interval the CLI accepts
pub const MIN_WATCH_INTERVAL_MS: u64 = 100;

/// Default number of ids per batch request
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// Default per-request HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Substrings that mark a fetch error message as transient
pub const DEFAULT_RETRIABLE_PATTERNS: &[&str] = &[
    "not found",
    "objectnotfound",
    "network",
    "fetch",
    "temporarily",
];

// Duration forms of the millisecond defaults

/// Returns the default watch timeout
pub fn default_watch_timeout() -> Duration {
    Duration::from_millis(DEFAULT_WATCH_TIMEOUT_MS)
}

/// Returns the default watch interval
pub fn default_watch_interval() -> Duration {
    Duration::from_millis(DEFAULT_WATCH_INTERVAL_MS)
}
