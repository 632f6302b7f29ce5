//! Errors surfaced by object sources
//!
//! A [`FetchError`] always carries a human-readable message. Sources that
//! know what went wrong also attach a [`FetchErrorKind`], which lets the
//! retry policy classify the error without looking at the text.

use thiserror::Error;

/// Structured category of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum FetchErrorKind {
    /// Object does not exist yet (or was deleted)
    NotFound,
    /// Transport failure: connect, TLS, request timeout
    Network,
    /// Endpoint temporarily refusing work (rate limit, 5xx)
    Unavailable,
    /// The request itself was rejected
    InvalidArgument,
    /// Response could not be decoded
    Decode,
}

impl FetchErrorKind {
    /// Whether errors of this kind are expected to clear up on their own
    pub fn is_transient(self) -> bool {
        matches!(self, Self::NotFound | Self::Network | Self::Unavailable)
    }
}

/// Error returned by a single fetch of a remote object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    kind: Option<FetchErrorKind>,
    message: String,
}

impl FetchError {
    /// Create an error known only by its message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    /// Create an error with a structured kind
    pub fn with_kind(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
        }
    }

    pub fn not_found(object_id: &str) -> Self {
        Self::with_kind(
            FetchErrorKind::NotFound,
            format!("Object not found: {object_id}"),
        )
    }

    pub fn kind(&self) -> Option<FetchErrorKind> {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let err = FetchError::with_kind(FetchErrorKind::Network, "connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.kind(), Some(FetchErrorKind::Network));
    }

    #[test]
    fn test_not_found_message() {
        let err = FetchError::not_found("0xabc");
        assert_eq!(err.message(), "Object not found: 0xabc");
        assert!(err.kind().is_some_and(FetchErrorKind::is_transient));
    }

    #[test]
    fn test_transient_kinds() {
        assert!(FetchErrorKind::NotFound.is_transient());
        assert!(FetchErrorKind::Network.is_transient());
        assert!(FetchErrorKind::Unavailable.is_transient());
        assert!(!FetchErrorKind::InvalidArgument.is_transient());
        assert!(!FetchErrorKind::Decode.is_transient());
    }
}
