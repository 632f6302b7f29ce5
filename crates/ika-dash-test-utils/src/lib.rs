//! Shared test utilities for ika-dash
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`fetcher`]: Scripted object sources for poller tests
//! - [`rpc`]: Canned JSON-RPC HTTP server for client tests

pub mod fetcher;
pub mod rpc;

// Re-export commonly used items
pub use fetcher::{ScriptedFetcher, state_snapshot};
pub use rpc::{MockReply, MockRpcServer, object_result};

/// Find an available TCP port for testing
pub async fn find_available_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
