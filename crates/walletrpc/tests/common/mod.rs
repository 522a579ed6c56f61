//! Mock wallet RPC server for integration tests.
//!
//! Serves `/json_rpc` on a random loopback port and answers each request
//! through a stub function, recording every request it receives.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use walletrpc::envelope::{decode_request, IncomingRequest};
use walletrpc::WalletRpc;

/// What the mock wallet sends back for a request.
pub enum Reply {
    /// `{"jsonrpc":"2.0","id":<echo>,"result":<value>}`
    Result(Value),
    /// `{"jsonrpc":"2.0","id":<echo>,"error":{"code":..,"message":..}}`
    Error(i64, &'static str),
    /// Body sent verbatim with HTTP 200.
    Body(&'static str),
    /// Arbitrary status and body.
    Status(StatusCode, &'static str),
}

type Stub = Arc<dyn Fn(&IncomingRequest) -> Option<Reply> + Send + Sync>;

#[derive(Clone)]
struct MockState {
    stub: Stub,
    requests: Arc<Mutex<Vec<IncomingRequest>>>,
}

pub struct MockWallet {
    url: String,
    requests: Arc<Mutex<Vec<IncomingRequest>>>,
    task: JoinHandle<()>,
}

impl MockWallet {
    /// Start a wallet that answers with `stub`. Methods the stub does not
    /// handle get an "unknown error" reply.
    pub async fn start<F>(stub: F) -> Self
    where
        F: Fn(&IncomingRequest) -> Option<Reply> + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            stub: Arc::new(stub),
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/json_rpc", post(json_rpc))
            .with_state(state);
        Self::serve(app, requests).await
    }

    /// Start a server that answers every request with 404 and a body that
    /// happens to be a valid success envelope.
    pub async fn not_found() -> Self {
        let app = Router::new().fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"jsonrpc":"2.0","result":{"address":"4AdUndXHHZ","balance":1,"unlocked_balance":1}}"#,
            )
        });
        Self::serve(app, Arc::new(Mutex::new(Vec::new()))).await
    }

    async fn serve(app: Router, requests: Arc<Mutex<Vec<IncomingRequest>>>) -> Self {
        init_logging();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            url: format!("http://{}", addr),
            requests,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn wallet(&self) -> WalletRpc {
        WalletRpc::new(&self.url).unwrap()
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<IncomingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockWallet {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn json_rpc(State(state): State<MockState>, body: Bytes) -> Response {
    let req = match decode_request(&body) {
        Ok(req) => req,
        Err(_) => return (StatusCode::BAD_REQUEST, "bad request").into_response(),
    };
    state.requests.lock().unwrap().push(req.clone());

    let reply = (state.stub)(&req).unwrap_or(Reply::Error(-1, "method not stubbed"));
    match reply {
        Reply::Result(result) => json_response(json!({
            "jsonrpc": "2.0",
            "id": req.id,
            "result": result,
        })),
        Reply::Error(code, message) => json_response(json!({
            "jsonrpc": "2.0",
            "id": req.id,
            "error": { "code": code, "message": message },
        })),
        Reply::Body(body) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Reply::Status(status, body) => (status, body).into_response(),
    }
}

fn json_response(value: Value) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json")],
        value.to_string(),
    )
        .into_response()
}
