//! Transient vs fatal classification of fetch errors
//!
//! Object sources do not all report structured error kinds. When a
//! [`FetchError`] carries a [`FetchErrorKind`](ika_dash_common::FetchErrorKind)
//! the kind decides; otherwise the lower-cased message is matched against a
//! configurable set of substrings.

use ika_dash_common::FetchError;
use ika_dash_common::defaults::DEFAULT_RETRIABLE_PATTERNS;

/// Policy deciding whether a failed attempt should be retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Lower-case substrings that mark a message as transient
    patterns: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIABLE_PATTERNS.iter().copied())
    }
}

impl RetryPolicy {
    /// Create a policy from a set of substrings (matched case-insensitively)
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Add one more transient substring
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        let pattern = pattern.to_lowercase();
        if !pattern.is_empty() && !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check if an error is transient and the poll should keep going
    pub fn is_retriable(&self, error: &FetchError) -> bool {
        match error.kind() {
            Some(kind) => kind.is_transient(),
            None => self.message_is_retriable(error.message()),
        }
    }

    /// Substring check on a raw message
    pub fn message_is_retriable(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.patterns.iter().any(|p| message.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ika_dash_common::FetchErrorKind;

    #[test]
    fn test_default_patterns() {
        let policy = RetryPolicy::default();
        for message in [
            "ObjectNotFound: xyz",
            "object not found",
            "Network request failed",
            "Failed to fetch",
            "Service temporarily unavailable",
        ] {
            assert!(
                policy.is_retriable(&FetchError::new(message)),
                "Expected retriable: {message}"
            );
        }
    }

    #[test]
    fn test_fatal_messages() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_retriable(&FetchError::new("Invalid argument")));
        assert!(!policy.is_retriable(&FetchError::new("")));
        assert!(!policy.is_retriable(&FetchError::new("Deserialization failed")));
    }

    #[test]
    fn test_kind_overrides_message() {
        let policy = RetryPolicy::default();

        // Message looks transient, kind says otherwise
        let err = FetchError::with_kind(FetchErrorKind::InvalidArgument, "fetch rejected");
        assert!(!policy.is_retriable(&err));

        // Message looks fatal, kind says transient
        let err = FetchError::with_kind(FetchErrorKind::Unavailable, "HTTP 503");
        assert!(policy.is_retriable(&err));
    }

    #[test]
    fn test_custom_patterns() {
        let policy = RetryPolicy::new(["Rate Limited"]);
        assert!(policy.message_is_retriable("429: rate limited"));
        assert!(!policy.message_is_retriable("network down"));

        let policy = policy.with_pattern("NETWORK").with_pattern("network");
        assert_eq!(policy.patterns(), ["rate limited", "network"]);
        assert!(policy.message_is_retriable("network down"));
    }

    #[test]
    fn test_empty_patterns_are_dropped() {
        let policy = RetryPolicy::new(["", "busy"]).with_pattern("");
        assert_eq!(policy.patterns(), ["busy"]);
        assert!(!policy.message_is_retriable("anything"));
    }
}
