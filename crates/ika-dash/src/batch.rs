//! Batch object queries
//!
//! Fetches a list of ids in chunks. The client's [`BatchSupport`] decides
//! once whether chunks go out as single batch requests or as one request
//! per id; a failed batch request degrades that chunk to per-id requests.

use crate::client::rpc::EMPTY_BATCH_ENTRY;
use crate::client::{BatchSupport, ObjectFetcher};
use futures::future::join_all;
use ika_dash_common::defaults::DEFAULT_CHUNK_SIZE;
use ika_dash_common::{FetchError, FetchErrorKind};
use serde_json::{Value, json};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Split raw user input into unique ids.
///
/// Ids may be separated by commas or any whitespace. Order of first
/// occurrence is kept.
pub fn parse_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// Heuristic check for an object id: `0x` followed by hex digits
pub fn looks_like_object_id(id: &str) -> bool {
    id.len() >= 4
        && id
            .strip_prefix("0x")
            .is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Result for one requested id
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: String,
    pub result: Result<Value, FetchError>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn to_json(&self) -> Value {
        match &self.result {
            Ok(data) => json!({ "id": self.id, "ok": true, "data": data }),
            Err(e) => json!({ "id": self.id, "ok": false, "error": e.message() }),
        }
    }
}

/// Success/failure counts of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub ok: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        let ok = items.iter().filter(|i| i.is_ok()).count();
        Self {
            ok,
            failed: items.len() - ok,
            total: items.len(),
        }
    }
}

/// Chunked multi-object query over any [`ObjectFetcher`]
pub struct BatchQuery<'a, C> {
    client: &'a C,
    chunk_size: usize,
}

impl<'a, C: ObjectFetcher> BatchQuery<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Ids per request; zero is treated as one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Fetch every id; results follow input order
    pub async fn run(&self, ids: &[String]) -> Vec<BatchItem> {
        let support = self.client.batch_support();
        debug!(ids = ids.len(), chunk_size = self.chunk_size, %support, "Running batch query");

        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(self.chunk_size) {
            let chunk_items = match support {
                BatchSupport::Native => self.fetch_native(chunk).await,
                BatchSupport::PerItem => self.fetch_per_item(chunk).await,
            };
            items.extend(chunk_items);
        }
        items
    }

    async fn fetch_native(&self, chunk: &[String]) -> Vec<BatchItem> {
        match self.client.fetch_objects(chunk).await {
            Ok(entries) => {
                let mut entries = entries.into_iter();
                chunk
                    .iter()
                    .map(|id| BatchItem {
                        id: id.clone(),
                        result: entries.next().unwrap_or_else(|| {
                            Err(FetchError::with_kind(
                                FetchErrorKind::NotFound,
                                EMPTY_BATCH_ENTRY,
                            ))
                        }),
                    })
                    .collect()
            }
            Err(e) => {
                warn!(
                    chunk = chunk.len(),
                    error = %e,
                    "Batch request failed, falling back to per-id requests"
                );
                self.fetch_per_item(chunk).await
            }
        }
    }

    async fn fetch_per_item(&self, chunk: &[String]) -> Vec<BatchItem> {
        join_all(chunk.iter().map(|id| async move {
            BatchItem {
                id: id.clone(),
                result: self.client.fetch_object(id).await,
            }
        }))
        .await
    }
}
