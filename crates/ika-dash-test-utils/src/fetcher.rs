//! Scripted object sources
//!
//! A [`ScriptedFetcher`] replays a fixed list of fetch results. Once the
//! script runs out the last entry repeats, so a script of `["A", "B"]`
//! models an object that reaches `B` and stays there.

use ika_dash_common::FetchError;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Snapshot whose lifecycle state is the tagged `label`
pub fn state_snapshot(label: &str) -> Value {
    json!({ "state": { "$kind": label } })
}

/// Replays scripted results in order, repeating the last one
#[derive(Debug)]
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<Value, FetchError>>>,
    calls: AtomicU32,
}

impl ScriptedFetcher {
    /// # Panics
    ///
    /// Panics if `script` is empty.
    pub fn new(script: Vec<Result<Value, FetchError>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one entry");
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        }
    }

    /// Script of successful fetches with the given state labels
    pub fn states(labels: &[&str]) -> Self {
        Self::new(labels.iter().map(|l| Ok(state_snapshot(l))).collect())
    }

    /// Next scripted result
    pub async fn fetch(&self) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }

    /// Number of fetches so far
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ika_dash_common::extract_state;

    #[tokio::test]
    async fn test_last_entry_repeats() {
        let fetcher = ScriptedFetcher::states(&["A", "B"]);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(extract_state(&fetcher.fetch().await.unwrap()).unwrap());
        }
        assert_eq!(seen, ["A", "B", "B", "B"]);
        assert_eq!(fetcher.call_count(), 4);
    }

    #[tokio::test]
    async fn test_errors_replay() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::new("boom")), Ok(state_snapshot("X"))]);
        assert!(fetcher.fetch().await.is_err());
        assert!(fetcher.fetch().await.is_ok());
    }
}
