//! Client handle for reading network objects
//!
//! An [`IkaClient`] is built once per selected network from a
//! [`ClientConfig`] and passed by reference to everything that fetches.
//! Switching networks means building a new handle; nothing is global.

pub mod rpc;

use anyhow::Result;
use ika_dash_common::defaults::{DEFAULT_CHUNK_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
use ika_dash_common::{FetchError, FetchErrorKind, Network, ResourceKind};
use rpc::{OwnedPage, RpcClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ConfigError;

/// How a client fetches many objects at once.
///
/// Chosen once per client configuration instead of detected on every call.
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
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BatchSupport {
    /// The endpoint answers a list of ids in one request
    #[default]
    Native,
    /// One request per id
    PerItem,
}

/// Result of one entry in a batch fetch
pub type BatchEntry = Result<Value, FetchError>;

/// Trait for object reads that can be mocked in tests.
pub trait ObjectFetcher: Send + Sync {
    /// Fetch one object snapshot by id
    fn fetch_object(&self, id: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;

    /// Batch capability of this fetcher
    fn batch_support(&self) -> BatchSupport {
        BatchSupport::PerItem
    }

    /// Fetch many objects in one request, preserving order.
    ///
    /// Only called when [`batch_support`](Self::batch_support) is
    /// [`BatchSupport::Native`]. An `Err` means the whole request failed.
    fn fetch_objects(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<BatchEntry>, FetchError>> + Send {
        let count = ids.len();
        async move {
            Err(FetchError::new(format!(
                "batch fetch of {count} objects is not supported by this client"
            )))
        }
    }
}

/// Connection settings for one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub network: Network,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Ids per batch request
    pub chunk_size: usize,
    pub batch_support: BatchSupport,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_network(Network::default())
    }
}

impl ClientConfig {
    /// Defaults for a network's public fullnode
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            rpc_url: network.fullnode_url().to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_support: BatchSupport::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.rpc_url).map_err(|e| ConfigError::InvalidRpcUrl {
            url: self.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}

/// Shared handle to one network.
///
/// Cheap to clone; clones share the underlying HTTP connection pool and may
/// be used concurrently by independent watches.
#[derive(Debug, Clone)]
pub struct IkaClient {
    config: Arc<ClientConfig>,
    rpc: Arc<RpcClient>,
}

impl IkaClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let rpc = RpcClient::new(&config.rpc_url, config.request_timeout)?;
        debug!(
            network = %config.network,
            rpc_url = %config.rpc_url,
            batch = %config.batch_support,
            "Created client"
        );
        Ok(Self {
            config: Arc::new(config),
            rpc: Arc::new(rpc),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    /// One page of objects owned by `owner`, optionally filtered by type
    pub async fn owned_objects_page(
        &self,
        owner: &str,
        struct_type: Option<&str>,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<OwnedPage, FetchError> {
        self.rpc
            .owned_objects_page(owner, struct_type, cursor, limit)
            .await
    }
}

impl ObjectFetcher for IkaClient {
    async fn fetch_object(&self, id: &str) -> Result<Value, FetchError> {
        self.rpc.get_object(id).await
    }

    fn batch_support(&self) -> BatchSupport {
        self.config.batch_support
    }

    async fn fetch_objects(&self, ids: &[String]) -> Result<Vec<BatchEntry>, FetchError> {
        self.rpc.multi_get_objects(ids).await
    }
}

/// Verify the snapshot's Move type against `kind`; untyped snapshots pass
pub fn check_kind(kind: ResourceKind, id: &str, snapshot: &Value) -> Result<(), FetchError> {
    match snapshot.get("type").and_then(Value::as_str) {
        Some(move_type) if !kind.matches_move_type(move_type) => Err(FetchError::with_kind(
            FetchErrorKind::InvalidArgument,
            format!(
                "Object {id} is not a {} (type {move_type})",
                kind.display_name()
            ),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_targets_testnet() {
        let config = ClientConfig::default();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.rpc_url, Network::Testnet.fullnode_url());
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.batch_support, BatchSupport::Native);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let mut config = ClientConfig::default();
        config.rpc_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRpcUrl { .. })
        ));

        config.rpc_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRpcUrl { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let config = ClientConfig {
            chunk_size: 0,
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChunkSize)));
    }

    #[test]
    fn test_batch_support_parse() {
        assert_eq!("per-item".parse::<BatchSupport>().ok(), Some(BatchSupport::PerItem));
        assert_eq!("NATIVE".parse::<BatchSupport>().ok(), Some(BatchSupport::Native));
        assert_eq!(BatchSupport::PerItem.to_string(), "per-item");
    }

    #[test]
    fn test_switching_network_builds_new_handle() {
        let testnet = IkaClient::new(ClientConfig::for_network(Network::Testnet)).unwrap();
        let mainnet = IkaClient::new(ClientConfig::for_network(Network::Mainnet)).unwrap();
        assert_eq!(testnet.network(), Network::Testnet);
        assert_eq!(mainnet.network(), Network::Mainnet);
        assert_eq!(testnet.clone().network(), Network::Testnet);
    }

    #[test]
    fn test_check_kind() {
        let dwallet = json!({ "type": "0x3::coordinator_inner::DWallet" });
        assert!(check_kind(ResourceKind::DWallet, "0x1", &dwallet).is_ok());

        let err = check_kind(ResourceKind::Presign, "0x1", &dwallet).unwrap_err();
        assert_eq!(err.kind(), Some(FetchErrorKind::InvalidArgument));
        assert!(err.message().contains("is not a Presign"));

        assert!(check_kind(ResourceKind::Presign, "0x1", &json!({})).is_ok());
    }
}
