//! Resource watches built on [`StatePoller`]
//!
//! A watch request names a resource kind and id; the kind supplies the
//! default target state and time budget, either of which can be
//! overridden. Fetches go through any [`ObjectFetcher`], so the same code
//! drives the live client and in-memory test fetchers.

use crate::client::{ObjectFetcher, check_kind};
use crate::retry::RetryPolicy;
use crate::wait::{Attempt, PollReport, StatePoller, WatchConfig};
use ika_dash_common::{FetchError, ResourceKind};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// What to watch and for how long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRequest {
    pub kind: ResourceKind,
    pub id: String,
    pub expected_state: String,
    pub config: WatchConfig,
}

impl WatchRequest {
    /// Request with the kind's target state and budget
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            expected_state: kind.target_state().to_string(),
            config: WatchConfig::for_kind(kind),
        }
    }

    pub fn with_expected_state(mut self, state: impl Into<String>) -> Self {
        self.expected_state = state.into();
        self
    }

    pub fn with_config(mut self, config: WatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Poller configured for this request
    pub fn poller(&self, policy: RetryPolicy, cancel: Option<CancellationToken>) -> StatePoller {
        let poller = StatePoller::new(&self.expected_state, self.config)
            .with_policy(policy)
            .with_resource(format!("{} {}", self.kind.display_name(), self.id));
        match cancel {
            Some(token) => poller.with_cancel(token),
            None => poller,
        }
    }
}

/// Fetch one object and check it is of `kind`
pub async fn fetch_resource<C: ObjectFetcher>(
    client: &C,
    kind: ResourceKind,
    id: &str,
) -> Result<Value, FetchError> {
    let snapshot = client.fetch_object(id).await?;
    check_kind(kind, id, &snapshot)?;
    Ok(snapshot)
}

/// Poll `request.id` until it reaches the expected state.
///
/// A snapshot whose Move type belongs to a different kind ends the watch
/// as a fatal error.
pub async fn watch_resource<C, O>(
    client: &C,
    request: &WatchRequest,
    policy: RetryPolicy,
    cancel: Option<CancellationToken>,
    on_attempt: O,
) -> PollReport<Value>
where
    C: ObjectFetcher,
    O: FnMut(&Attempt),
{
    request
        .poller(policy, cancel)
        .watch(|| fetch_resource(client, request.kind, &request.id), on_attempt)
        .await
}
