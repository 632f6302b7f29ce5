//! Waiting for remote objects to reach a lifecycle state.
//!
//! Provides a generic poller that repeatedly fetches an object until its
//! state matches a target, a deadline passes, or the caller cancels. Every
//! watcher in the crate is an instance of [`StatePoller`]; only the fetch
//! target and the expected state differ.

use crate::config::ConfigError;
use crate::retry::RetryPolicy;
use ika_dash_common::defaults::{default_watch_interval, default_watch_timeout};
use ika_dash_common::{FetchError, LifecycleState, ResourceKind, WatchStatus};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Label shown when no state has been observed
pub const UNKNOWN_STATE: &str = "unknown";

/// Returned by [`delay`] when the token fired first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Wait cancelled")]
pub struct Cancelled;

/// Sleep for `duration`, settling early if `cancel` fires.
///
/// An already-cancelled token returns immediately without arming a timer.
/// On early cancellation the sleep future is dropped, which releases the
/// timer.
pub async fn delay(duration: Duration, cancel: Option<&CancellationToken>) -> Result<(), Cancelled> {
    let Some(token) = cancel else {
        tokio::time::sleep(duration).await;
        return Ok(());
    };

    if token.is_cancelled() {
        return Err(Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

/// Time budget and pacing of a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Wall-clock budget measured from the start of the watch
    pub timeout: Duration,
    /// Delay between the end of one attempt and the start of the next
    pub interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timeout: default_watch_timeout(),
            interval: default_watch_interval(),
        }
    }
}

impl WatchConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Defaults tuned for a resource kind
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self {
            timeout: kind.default_timeout(),
            interval: kind.default_interval(),
        }
    }

    /// Create a new WatchConfig with the given timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Create a new WatchConfig with the given interval.
    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// How a watch ended
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// The fetched object reached the expected state
    Success(T),
    /// The deadline passed; carries the last state seen, if any
    Timeout { last_state: Option<String> },
    /// The caller cancelled
    Cancelled,
    /// A fetch failed with a non-retriable error
    Fatal(FetchError),
}

impl<T> PollOutcome<T> {
    pub fn status(&self) -> WatchStatus {
        match self {
            PollOutcome::Success(_) => WatchStatus::Success,
            PollOutcome::Timeout { .. } => WatchStatus::Timeout,
            PollOutcome::Cancelled => WatchStatus::Cancelled,
            PollOutcome::Fatal(_) => WatchStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Success(_))
    }

    /// Convert to a `Result` for `?` propagation, keeping the cases distinct
    pub fn into_result(self, expected_state: &str) -> Result<T, WatchError> {
        match self {
            PollOutcome::Success(snapshot) => Ok(snapshot),
            PollOutcome::Timeout { last_state } => Err(WatchError::Timeout {
                expected: expected_state.to_string(),
                last_state,
            }),
            PollOutcome::Cancelled => Err(WatchError::Cancelled),
            PollOutcome::Fatal(e) => Err(WatchError::Fatal(e)),
        }
    }
}

/// Unsuccessful watch outcomes as an error
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(
        "Timeout waiting for state: {} (last observed: {})",
        .expected,
        .last_state.as_deref().unwrap_or(UNKNOWN_STATE)
    )]
    Timeout {
        expected: String,
        last_state: Option<String>,
    },

    #[error("Watch cancelled")]
    Cancelled,

    #[error(transparent)]
    Fatal(#[from] FetchError),
}

/// One completed fetch, as reported to the attempt observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based attempt number
    pub number: u32,
    /// Extracted state; `None` for a transient failure or an unknown shape
    pub state: Option<String>,
}

/// Outcome plus accounting for a finished watch
#[derive(Debug)]
pub struct PollReport<T> {
    pub outcome: PollOutcome<T>,
    /// Number of fetch calls issued
    pub attempts: u32,
    /// Wall-clock time from start to resolution
    pub elapsed: Duration,
}

/// Polls a fetch operation until the fetched object reaches a target state.
///
/// A poller holds configuration only; each [`watch`](Self::watch) call keeps
/// its own counters, so one poller may serve any number of independent
/// watches.
#[derive(Debug, Clone)]
pub struct StatePoller {
    expected_state: String,
    config: WatchConfig,
    policy: RetryPolicy,
    cancel: Option<CancellationToken>,
    resource: String,
}

impl StatePoller {
    pub fn new(expected_state: impl Into<String>, config: WatchConfig) -> Self {
        Self {
            expected_state: expected_state.into(),
            config,
            policy: RetryPolicy::default(),
            cancel: None,
            resource: "resource".to_string(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Observe `token` for cancellation. The caller keeps ownership and
    /// cancels through its own clone.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Name used in log fields
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn expected_state(&self) -> &str {
        &self.expected_state
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Watch a snapshot type that knows its own lifecycle state
    pub async fn watch<T, F, Fut, O>(&self, fetch: F, on_attempt: O) -> PollReport<T>
    where
        T: LifecycleState,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
        O: FnMut(&Attempt),
    {
        self.watch_with(fetch, T::lifecycle_state, on_attempt).await
    }

    /// Watch with an explicit state extractor.
    ///
    /// Attempts run strictly one after another. The deadline is checked only
    /// between attempts, so an in-flight fetch is never preempted and a
    /// matching result that lands late still counts. Cancellation is checked
    /// before the first fetch, after every fetch and during every delay; an
    /// in-flight fetch is not interrupted but its result is discarded.
    #[instrument(skip_all, fields(resource = %self.resource, expected = %self.expected_state))]
    pub async fn watch_with<T, F, Fut, X, O>(
        &self,
        mut fetch: F,
        extract: X,
        mut on_attempt: O,
    ) -> PollReport<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
        X: Fn(&T) -> Option<String>,
        O: FnMut(&Attempt),
    {
        let start = Instant::now();
        let deadline = start + self.config.timeout;
        let mut attempts = 0u32;
        let mut last_state: Option<String> = None;

        let outcome = 'poll: {
            if self.is_cancelled() {
                break 'poll PollOutcome::Cancelled;
            }

            loop {
                attempts += 1;

                match fetch().await {
                    Ok(snapshot) => {
                        let state = extract(&snapshot);
                        debug!(attempt = attempts, state = ?state, "Fetched snapshot");
                        on_attempt(&Attempt {
                            number: attempts,
                            state: state.clone(),
                        });

                        if self.is_cancelled() {
                            break 'poll PollOutcome::Cancelled;
                        }
                        if state.as_deref() == Some(self.expected_state.as_str()) {
                            info!(attempts, "Reached expected state");
                            break 'poll PollOutcome::Success(snapshot);
                        }
                        last_state = state;
                    }
                    Err(e) if self.policy.is_retriable(&e) => {
                        debug!(attempt = attempts, error = %e, "Transient fetch error, retrying");
                        on_attempt(&Attempt {
                            number: attempts,
                            state: None,
                        });
                        last_state = None;
                    }
                    Err(e) => {
                        if self.is_cancelled() {
                            break 'poll PollOutcome::Cancelled;
                        }
                        warn!(attempt = attempts, error = %e, "Non-retriable fetch error");
                        break 'poll PollOutcome::Fatal(e);
                    }
                }

                if self.is_cancelled() {
                    break 'poll PollOutcome::Cancelled;
                }

                if Instant::now() >= deadline {
                    debug!(
                        attempts,
                        last_state = ?last_state,
                        timeout_ms = self.config.timeout.as_millis(),
                        "Deadline passed"
                    );
                    break 'poll PollOutcome::Timeout { last_state };
                }

                if delay(self.config.interval, self.cancel.as_ref()).await.is_err() {
                    break 'poll PollOutcome::Cancelled;
                }
            }
        };

        PollReport {
            outcome,
            attempts,
            elapsed: start.elapsed(),
        }
    }
}
