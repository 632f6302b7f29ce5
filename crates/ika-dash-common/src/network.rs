//! Supported networks and fullnode endpoints

use serde::{Deserialize, Serialize};

/// Network a client handle talks to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    /// Public fullnode JSON-RPC endpoint for this network
    pub fn fullnode_url(self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
        }
    }

    /// Network the key-management contracts are deployed on.
    ///
    /// Only mainnet and testnet carry a deployment; devnet falls back to
    /// testnet.
    pub fn ika_network(self) -> Network {
        match self {
            Network::Devnet => Network::Testnet,
            other => other,
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
    fn test_parse_case_insensitive() {
        assert_eq!(Network::parse("MAINNET"), Some(Network::Mainnet));
        assert_eq!(Network::parse("testnet"), Some(Network::Testnet));
        assert_eq!(Network::parse("localnet"), None);
    }

    #[test]
    fn test_display_round_trips() {
        for network in Network::iter() {
            assert_eq!(Network::parse(&network.to_string()), Some(network));
        }
    }

    #[test]
    fn test_devnet_maps_to_testnet() {
        assert_eq!(Network::Devnet.ika_network(), Network::Testnet);
        assert_eq!(Network::Mainnet.ika_network(), Network::Mainnet);
        assert_eq!(Network::Testnet.ika_network(), Network::Testnet);
    }

    #[test]
    fn test_fullnode_urls_are_distinct() {
        assert!(Network::Mainnet.fullnode_url().contains("mainnet"));
        assert!(Network::Testnet.fullnode_url().contains("testnet"));
        assert!(Network::Devnet.fullnode_url().contains("devnet"));
    }
}
