//! JSON-RPC object reads against a fullnode

use super::BatchEntry;
use anyhow::{Context, Result};
use ika_dash_common::state::KIND_TAG;
use ika_dash_common::{FetchError, FetchErrorKind};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// JSON-RPC "invalid params" error code
const INVALID_PARAMS: i64 = -32602;

/// Message used for batch entries the endpoint left empty
pub const EMPTY_BATCH_ENTRY: &str = "Not found or empty result";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC client for object reads
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one JSON-RPC call and return its `result`
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, FetchError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, "Sending RPC request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FetchError::with_kind(
                FetchErrorKind::Unavailable,
                format!("{method}: endpoint temporarily unavailable (HTTP {status})"),
            ));
        }
        if !status.is_success() {
            return Err(FetchError::with_kind(
                FetchErrorKind::InvalidArgument,
                format!("{method}: request rejected (HTTP {status})"),
            ));
        }

        let envelope: RpcResponse = response.json().await.map_err(|e| {
            FetchError::with_kind(
                FetchErrorKind::Decode,
                format!("{method}: invalid response body: {e}"),
            )
        })?;

        if let Some(error) = envelope.error {
            debug!(method, code = error.code, message = %error.message, "RPC error");
            return Err(rpc_error(error));
        }

        envelope.result.ok_or_else(|| {
            FetchError::with_kind(
                FetchErrorKind::Decode,
                format!("{method}: response has neither result nor error"),
            )
        })
    }

    /// Fetch one object as a snapshot
    pub async fn get_object(&self, id: &str) -> Result<Value, FetchError> {
        let result = self
            .call("sui_getObject", json!([id, object_options()]))
            .await?;
        object_snapshot(id, &result)
    }

    /// Fetch many objects in one request; entries follow `ids` order
    pub async fn multi_get_objects(&self, ids: &[String]) -> Result<Vec<BatchEntry>, FetchError> {
        let result = self
            .call("sui_multiGetObjects", json!([ids, object_options()]))
            .await?;

        let Value::Array(entries) = result else {
            return Err(FetchError::with_kind(
                FetchErrorKind::Decode,
                "sui_multiGetObjects: expected an array result",
            ));
        };

        let mut entries = entries.into_iter();
        Ok(ids
            .iter()
            .map(|id| match entries.next() {
                Some(Value::Null) | None => Err(FetchError::with_kind(
                    FetchErrorKind::NotFound,
                    EMPTY_BATCH_ENTRY,
                )),
                Some(entry) => object_snapshot(id, &entry),
            })
            .collect())
    }

    /// Fetch one page of objects owned by `owner`.
    ///
    /// `struct_type` is a fully qualified Move type; `None` lists every
    /// owned object.
    pub async fn owned_objects_page(
        &self,
        owner: &str,
        struct_type: Option<&str>,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<OwnedPage, FetchError> {
        let filter = match struct_type {
            Some(struct_type) => json!({ "StructType": struct_type }),
            None => Value::Null,
        };
        let query = json!({ "filter": filter, "options": object_options() });
        let result = self
            .call("suix_getOwnedObjects", json!([owner, query, cursor, limit]))
            .await?;
        owned_page(&result)
    }
}

/// One page of `suix_getOwnedObjects`
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedPage {
    /// Raw entries, each shaped like a `sui_getObject` response
    pub entries: Vec<Value>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

impl OwnedPage {
    /// Cursor for the following page, if there is one
    pub fn next(&self) -> Option<&str> {
        if self.has_next_page {
            self.next_cursor.as_deref()
        } else {
            None
        }
    }
}

/// Decode a `suix_getOwnedObjects` result
pub fn owned_page(result: &Value) -> Result<OwnedPage, FetchError> {
    let entries = result
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FetchError::with_kind(
                FetchErrorKind::Decode,
                "suix_getOwnedObjects: expected a data array",
            )
        })?
        .clone();

    Ok(OwnedPage {
        entries,
        next_cursor: result
            .get("nextCursor")
            .and_then(Value::as_str)
            .map(str::to_string),
        has_next_page: result
            .get("hasNextPage")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn object_options() -> Value {
    json!({ "showType": true, "showContent": true })
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_decode() {
        FetchError::with_kind(FetchErrorKind::Decode, format!("invalid response body: {e}"))
    } else {
        FetchError::with_kind(FetchErrorKind::Network, format!("network error: {e}"))
    }
}

fn rpc_error(error: RpcErrorBody) -> FetchError {
    if error.code == INVALID_PARAMS {
        FetchError::with_kind(FetchErrorKind::InvalidArgument, error.message)
    } else {
        // No structured kind: the retry policy falls back to the message
        FetchError::new(error.message)
    }
}

/// Turn a `sui_getObject` response into a snapshot.
///
/// The snapshot is the object's Move fields plus `objectId` and `type`.
pub fn object_snapshot(id: &str, response: &Value) -> Result<Value, FetchError> {
    if let Some(error) = response.get("error") {
        return Err(object_error(id, error));
    }

    let data = response.get("data").ok_or_else(|| {
        FetchError::with_kind(
            FetchErrorKind::Decode,
            format!("Object {id}: response has no data"),
        )
    })?;

    let content = data.get("content");
    let fields = content
        .and_then(|c| c.get("fields"))
        .and_then(Value::as_object)
        .ok_or_else(|| {
            FetchError::with_kind(
                FetchErrorKind::Decode,
                format!("Object {id} has no Move content"),
            )
        })?;

    let mut snapshot = Map::with_capacity(fields.len() + 2);
    let object_id = data.get("objectId").and_then(Value::as_str).unwrap_or(id);
    snapshot.insert("objectId".to_string(), Value::from(object_id));
    if let Some(move_type) = data
        .get("type")
        .or_else(|| content.and_then(|c| c.get("type")))
    {
        snapshot.insert("type".to_string(), move_type.clone());
    }
    for (key, value) in fields {
        snapshot.insert(key.clone(), value.clone());
    }

    let mut snapshot = Value::Object(snapshot);
    tag_enum_variants(&mut snapshot);
    Ok(snapshot)
}

fn object_error(id: &str, error: &Value) -> FetchError {
    match error.get("code").and_then(Value::as_str) {
        Some("notExists") | Some("dynamicFieldNotFound") => FetchError::not_found(id),
        Some("deleted") => FetchError::with_kind(
            FetchErrorKind::NotFound,
            format!("Object {id} was deleted"),
        ),
        _ => FetchError::new(format!("Object {id}: {error}")),
    }
}

/// Add a `$kind` tag to every Move enum value rendered as
/// `{ "variant": "X", ... }` so the state extractor can read it.
pub fn tag_enum_variants(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if !map.contains_key(KIND_TAG) {
                if let Some(Value::String(variant)) = map.get("variant") {
                    let variant = variant.clone();
                    map.insert(KIND_TAG.to_string(), Value::String(variant));
                }
            }
            map.values_mut().for_each(tag_enum_variants);
        }
        Value::Array(items) => items.iter_mut().for_each(tag_enum_variants),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ika_dash_common::extract_state;

    fn dwallet_response(variant: &str) -> Value {
        json!({
            "data": {
                "objectId": "0xd1",
                "type": "0x3::coordinator_inner::DWallet",
                "content": {
                    "dataType": "moveObject",
                    "type": "0x3::coordinator_inner::DWallet",
                    "fields": {
                        "id": { "id": "0xd1" },
                        "curve": 0,
                        "state": {
                            "type": "0x3::coordinator_inner::DWalletState",
                            "variant": variant,
                            "fields": {}
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_object_snapshot_flattens_fields() {
        let snapshot = object_snapshot("0xd1", &dwallet_response("Active")).unwrap();
        assert_eq!(snapshot["objectId"], "0xd1");
        assert_eq!(snapshot["type"], "0x3::coordinator_inner::DWallet");
        assert_eq!(snapshot["curve"], 0);
        assert_eq!(extract_state(&snapshot).as_deref(), Some("Active"));
    }

    #[test]
    fn test_object_snapshot_not_found() {
        let response = json!({ "error": { "code": "notExists", "object_id": "0xd1" } });
        let err = object_snapshot("0xd1", &response).unwrap_err();
        assert_eq!(err.kind(), Some(FetchErrorKind::NotFound));
        assert_eq!(err.message(), "Object not found: 0xd1");
    }

    #[test]
    fn test_object_snapshot_deleted_is_not_found() {
        let response = json!({ "error": { "code": "deleted", "object_id": "0xd1" } });
        let err = object_snapshot("0xd1", &response).unwrap_err();
        assert_eq!(err.kind(), Some(FetchErrorKind::NotFound));
        assert_eq!(err.message(), "Object 0xd1 was deleted");
    }

    #[test]
    fn test_object_snapshot_without_content() {
        let response = json!({ "data": { "objectId": "0xd1" } });
        let err = object_snapshot("0xd1", &response).unwrap_err();
        assert_eq!(err.kind(), Some(FetchErrorKind::Decode));
    }

    #[test]
    fn test_tag_enum_variants_nested() {
        let mut value = json!({
            "a": [{ "variant": "X" }],
            "b": { "variant": "Y", "$kind": "Keep" },
            "c": { "variant": 3 }
        });
        tag_enum_variants(&mut value);
        assert_eq!(value["a"][0]["$kind"], "X");
        assert_eq!(value["b"]["$kind"], "Keep");
        assert!(value["c"].get("$kind").is_none());
    }

    #[test]
    fn test_owned_page() {
        let page = owned_page(&json!({
            "data": [dwallet_response("Active")],
            "nextCursor": "0xc1",
            "hasNextPage": true
        }))
        .unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.next(), Some("0xc1"));

        let last = owned_page(&json!({ "data": [], "nextCursor": "0xc1", "hasNextPage": false }))
            .unwrap();
        assert_eq!(last.next(), None);

        let err = owned_page(&json!({ "nextCursor": null })).unwrap_err();
        assert_eq!(err.kind(), Some(FetchErrorKind::Decode));
    }

    #[test]
    fn test_rpc_error_mapping() {
        let err = rpc_error(RpcErrorBody {
            code: INVALID_PARAMS,
            message: "Invalid params".to_string(),
        });
        assert_eq!(err.kind(), Some(FetchErrorKind::InvalidArgument));

        let err = rpc_error(RpcErrorBody {
            code: -32000,
            message: "Service temporarily overloaded".to_string(),
        });
        assert_eq!(err.kind(), None);
        assert_eq!(err.message(), "Service temporarily overloaded");
    }
}
