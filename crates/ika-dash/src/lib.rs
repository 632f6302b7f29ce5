//! ika-dash - Watch Ika network objects reach their lifecycle states
//!
//! This crate provides the object client, the generic state poller and
//! the `ika-dash` command-line tool built on them.
//!
//! ## Modules
//!
//! - [`batch`]: Chunked multi-object queries
//! - [`caps`]: dWallet capabilities owned by an address
//! - [`client`]: Network client handle and the [`client::ObjectFetcher`] seam
//! - [`config`]: Config file loading and validation
//! - [`retry`]: Transient vs fatal classification of fetch errors
//! - [`wait`]: The generic state poller
//! - [`watcher`]: Resource-specific watches built on the poller

pub mod batch;
pub mod caps;
pub mod client;
pub mod config;
pub mod retry;
pub mod wait;
pub mod watcher;

pub use client::{ClientConfig, IkaClient, ObjectFetcher};
pub use retry::RetryPolicy;
pub use wait::{PollOutcome, PollReport, StatePoller, WatchConfig, WatchError};
pub use watcher::{WatchRequest, watch_resource};
