//! ika-dash-common - Shared types and utilities
//!
//! This crate provides the vocabulary shared by the watcher library, the CLI
//! and the test fixtures, without any HTTP or runtime dependencies.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values
//! - [`error`]: Fetch error type carried from object sources to the poller
//! - [`network`]: Supported networks and their fullnode endpoints
//! - [`resource_kind`]: Watchable object kinds and their target states
//! - [`state`]: Lifecycle state extraction from fetched snapshots
//! - [`status`]: Watch status labels for presentation

pub mod defaults;
pub mod error;
pub mod network;
pub mod resource_kind;
pub mod state;
pub mod status;

// Re-export commonly used types
pub use error::{FetchError, FetchErrorKind};
pub use network::Network;
pub use resource_kind::ResourceKind;
pub use state::{LifecycleState, extract_state};
pub use status::WatchStatus;

/// Format a millisecond count for display.
///
/// Values below one second are shown as `"N ms"`, anything longer as `mm:ss`.
pub fn format_ms(ms: u128) -> String {
    if ms < 1000 {
        return format!("{ms} ms");
    }
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Percentage of the time budget consumed, clamped to `0..=100`.
///
/// A zero budget reports 0 rather than dividing by zero.
pub fn progress_percent(elapsed_ms: u128, timeout_ms: u128) -> f64 {
    if timeout_ms == 0 {
        return 0.0;
    }
    let pct = elapsed_ms as f64 / timeout_ms as f64 * 100.0;
    pct.min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "0 ms");
        assert_eq!(format_ms(999), "999 ms");
        assert_eq!(format_ms(1000), "00:01");
        assert_eq!(format_ms(61_500), "01:01");
        assert_eq!(format_ms(3_600_000), "60:00");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(500, 0), 0.0);
        assert_eq!(progress_percent(500, 1000), 50.0);
        assert_eq!(progress_percent(5000, 1000), 100.0);
    }
}
