//! Watchable object kinds
//!
//! Each kind names the lifecycle state a watcher waits for by default and
//! the time budget that usually suffices for the network to get there.

use crate::defaults::{DEFAULT_WATCH_INTERVAL_MS, DEFAULT_WATCH_TIMEOUT_MS};
use std::time::Duration;

/// Kinds of network objects the dashboard can fetch and watch
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ResourceKind {
    /// Distributed wallet; usable once `Active`
    #[strum(serialize = "dwallet")]
    DWallet,
    /// Precomputed signing material; usable once `Completed`
    #[strum(serialize = "presign")]
    Presign,
    /// User secret key share encrypted to a user key
    #[strum(serialize = "encrypted-share")]
    EncryptedUserSecretKeyShare,
    /// User half of a future signature
    #[strum(serialize = "partial-signature")]
    PartialUserSignature,
}

impl ResourceKind {
    /// State label a watcher waits for unless told otherwise
    pub fn target_state(self) -> &'static str {
        match self {
            ResourceKind::DWallet => "Active",
            ResourceKind::Presign => "Completed",
            ResourceKind::EncryptedUserSecretKeyShare => "KeyHolderSigned",
            ResourceKind::PartialUserSignature => "NetworkVerificationCompleted",
        }
    }

    /// Default time budget for a watch
    ///
    /// dWallet creation runs a full distributed key generation and gets a
    /// longer budget than the other kinds.
    pub fn default_timeout(self) -> Duration {
        match self {
            ResourceKind::DWallet => Duration::from_secs(60),
            _ => Duration::from_millis(DEFAULT_WATCH_TIMEOUT_MS),
        }
    }

    /// Default delay between attempts
    pub fn default_interval(self) -> Duration {
        match self {
            ResourceKind::DWallet => Duration::from_secs(2),
            _ => Duration::from_millis(DEFAULT_WATCH_INTERVAL_MS),
        }
    }

    /// Name of the Move struct backing objects of this kind
    pub fn move_struct(self) -> &'static str {
        match self {
            ResourceKind::DWallet => "DWallet",
            ResourceKind::Presign => "PresignSession",
            ResourceKind::EncryptedUserSecretKeyShare => "EncryptedUserSecretKeyShare",
            ResourceKind::PartialUserSignature => "PartialUserSignature",
        }
    }

    /// Check a fully qualified Move type (`0x..::module::Struct<..>`)
    /// against this kind
    pub fn matches_move_type(self, move_type: &str) -> bool {
        let base = move_type.split('<').next().unwrap_or(move_type);
        base.rsplit("::").next() == Some(self.move_struct())
    }

    /// Human-readable name used in messages
    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::DWallet => "dWallet",
            ResourceKind::Presign => "Presign",
            ResourceKind::EncryptedUserSecretKeyShare => "EncryptedUserSecretKeyShare",
            ResourceKind::PartialUserSignature => "PartialUserSignature",
        }
    }

    /// Parse from string, returning None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_target_states() {
        assert_eq!(ResourceKind::DWallet.target_state(), "Active");
        assert_eq!(ResourceKind::Presign.target_state(), "Completed");
    }

    #[test]
    fn test_dwallet_gets_longer_budget() {
        assert_eq!(
            ResourceKind::DWallet.default_timeout(),
            Duration::from_secs(60)
        );
        assert_eq!(
            ResourceKind::DWallet.default_interval(),
            Duration::from_secs(2)
        );
        assert_eq!(
            ResourceKind::Presign.default_timeout(),
            Duration::from_secs(30)
        );
        assert_eq!(
            ResourceKind::Presign.default_interval(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_matches_move_type() {
        assert!(ResourceKind::DWallet.matches_move_type("0x3::coordinator_inner::DWallet"));
        assert!(
            ResourceKind::Presign
                .matches_move_type("0xabc::coordinator_inner::PresignSession")
        );
        assert!(!ResourceKind::DWallet.matches_move_type("0x3::coordinator_inner::DWalletCap"));
        assert!(ResourceKind::DWallet.matches_move_type("0x3::m::DWallet<0x2::sui::SUI>"));
        assert!(!ResourceKind::Presign.matches_move_type(""));
    }

    #[test]
    fn test_cli_names_parse() {
        for kind in ResourceKind::iter() {
            assert_eq!(ResourceKind::parse(kind.as_ref()), Some(kind));
        }
        assert_eq!(ResourceKind::parse("DWALLET"), Some(ResourceKind::DWallet));
        assert_eq!(ResourceKind::parse("wallet"), None);
    }
}
