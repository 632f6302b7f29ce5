//! Configuration loading and validation
//!
//! Settings come from three layers, lowest priority first: built-in
//! defaults, an optional JSON file, and command-line flags.

use crate::client::{BatchSupport, ClientConfig};
use crate::retry::RetryPolicy;
use crate::wait::WatchConfig;
use ika_dash_common::Network;
use ika_dash_common::defaults::MIN_WATCH_INTERVAL_MS;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// interval is zero
    #[error("interval must be greater than 0")]
    ZeroInterval,

    /// interval below the supported minimum
    #[error("interval must be at least {min} ms, got {got} ms")]
    IntervalTooShort { min: u64, got: u64 },

    /// chunk_size is zero
    #[error("chunk_size must be at least 1")]
    ZeroChunkSize,

    /// rpc_url does not parse as an http(s) URL
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    /// Field-level validation of the config file failed
    #[error("Invalid config: {0}")]
    Validation(#[from] garde::Report),

    /// Failed to parse JSON configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to read configuration file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Check a user-supplied interval against the supported minimum
pub fn validate_interval_ms(interval_ms: u64) -> Result<(), ConfigError> {
    if interval_ms < MIN_WATCH_INTERVAL_MS {
        return Err(ConfigError::IntervalTooShort {
            min: MIN_WATCH_INTERVAL_MS,
            got: interval_ms,
        });
    }
    Ok(())
}

/// Settings read from a JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, garde::Validate)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    #[garde(skip)]
    pub network: Option<Network>,

    /// Override of the network's public fullnode
    #[serde(default)]
    #[garde(length(min = 1))]
    pub rpc_url: Option<String>,

    #[serde(default)]
    #[garde(range(min = 1))]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    #[garde(range(min = 1))]
    pub chunk_size: Option<usize>,

    #[serde(default)]
    #[garde(skip)]
    pub batch_support: Option<BatchSupport>,

    #[serde(default)]
    #[garde(skip)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    #[garde(range(min = 100))]
    pub interval_ms: Option<u64>,

    /// Coordinator package id used to filter owned dWallet caps
    #[serde(default)]
    #[garde(length(min = 1))]
    pub dwallet_package: Option<String>,

    /// Replaces the default set of transient error substrings
    #[serde(default)]
    #[garde(skip)]
    pub retriable_patterns: Option<Vec<String>>,
}

impl FileConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = serde_json::from_str(content)?;
        garde::Validate::validate(&config)?;
        Ok(config)
    }

    /// Client configuration with file values over defaults
    pub fn client_config(&self, network: Option<Network>) -> ClientConfig {
        let network = network.or(self.network).unwrap_or_default();
        let mut config = ClientConfig::for_network(network);
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(batch_support) = self.batch_support {
            config.batch_support = batch_support;
        }
        config
    }

    /// Watch configuration with file values over the kind's defaults
    pub fn watch_config(&self, base: WatchConfig) -> WatchConfig {
        let mut config = base;
        if let Some(ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.interval_ms {
            config.interval = Duration::from_millis(ms);
        }
        config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match &self.retriable_patterns {
            Some(patterns) => RetryPolicy::new(patterns),
            None => RetryPolicy::default(),
        }
    }
}
