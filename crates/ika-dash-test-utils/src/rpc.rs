//! Canned JSON-RPC server
//!
//! An axum router with a single `POST /` route. Every request body is
//! recorded for later assertions and answered by a test-supplied handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

/// HTTP reply for one request
#[derive(Debug, Clone, PartialEq)]
pub struct MockReply {
    pub status: u16,
    pub body: Value,
}

impl MockReply {
    /// 200 with a JSON-RPC `result`, echoing the request id
    pub fn result(request: &Value, result: Value) -> Self {
        Self {
            status: 200,
            body: json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
        }
    }

    /// 200 with a JSON-RPC `error`
    pub fn rpc_error(request: &Value, code: i64, message: &str) -> Self {
        Self {
            status: 200,
            body: json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message }
            }),
        }
    }

    /// Bare HTTP status with an empty JSON body
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({}),
        }
    }
}

type Handler = dyn Fn(&Value) -> MockReply + Send + Sync;

/// `sui_getObject` result for a Move object with `fields`
pub fn object_result(id: &str, move_type: &str, fields: Value) -> Value {
    json!({
        "data": {
            "objectId": id,
            "version": "1",
            "type": move_type,
            "content": {
                "dataType": "moveObject",
                "type": move_type,
                "hasPublicTransfer": false,
                "fields": fields
            }
        }
    })
}

#[derive(Clone)]
struct MockState {
    handler: Arc<Handler>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// JSON-RPC server on a random local port
pub struct MockRpcServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    task: JoinHandle<()>,
}

impl MockRpcServer {
    /// Start serving; `handler` maps each request body to a reply
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Value) -> MockReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = MockState {
            handler: Arc::new(handler),
            requests: requests.clone(),
        };
        let app = Router::new().route("/", post(handle)).with_state(state);

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                debug!(error = %e, "Mock RPC server stopped");
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Methods of the requests received so far
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Drop for MockRpcServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    State(state): State<MockState>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(request.clone());
    let reply = (state.handler)(&request);
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_echo_request_id() {
        let request = json!({ "jsonrpc": "2.0", "id": 7, "method": "sui_getObject" });

        let ok = MockReply::result(&request, json!({ "data": null }));
        assert_eq!(ok.status, 200);
        assert_eq!(ok.body["id"], 7);
        assert_eq!(ok.body["result"]["data"], Value::Null);

        let err = MockReply::rpc_error(&request, -32602, "Invalid params");
        assert_eq!(err.body["id"], 7);
        assert_eq!(err.body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_binds_local_port() {
        let server = MockRpcServer::start(|_| MockReply::status(503)).await;
        assert!(server.url().starts_with("http://127.0.0.1:"));
        assert!(server.requests().is_empty());
    }
}
