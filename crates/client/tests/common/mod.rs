//! In-process mock backend for client integration tests.
//!
//! [`MockBackend::spawn`] binds an Axum router on `127.0.0.1:0` whose single
//! fallback handler records every request and answers with the next queued
//! [`Reply`] (or `200 {}` once the queue is empty).

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use axum::Router;

use intake_client::{
    AccessToken, ClientError, HttpErrorHandler, RequestInfo, ResourceClient, TokenError,
    TokenProvider,
};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("content-type".into(), "application/json".into())],
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone, Default)]
pub struct MockBackend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

impl MockBackend {
    /// Start the mock server and return it with its base URL.
    pub async fn spawn(replies: Vec<Reply>) -> (Self, String) {
        let backend = Self {
            requests: Arc::default(),
            replies: Arc::new(Mutex::new(replies.into())),
        };

        let app = Router::new()
            .fallback(record)
            .with_state(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (backend, format!("http://{addr}"))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(backend): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    backend.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.to_vec(),
    });

    let reply = backend
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Reply::json(200, serde_json::json!({})));

    let mut builder = Response::builder().status(reply.status);
    for (name, value) in reply.headers {
        builder = builder.header(name, value);
    }
    builder.body(Body::from(reply.body)).unwrap()
}

// ---------------------------------------------------------------------------
// Test doubles for the injected collaborators
// ---------------------------------------------------------------------------

/// Error handler that counts invocations.
#[derive(Default)]
pub struct CountingHandler {
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

impl CountingHandler {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpErrorHandler for CountingHandler {
    fn handle(&self, request: &RequestInfo, _error: &ClientError) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(request.url.clone());
    }
}

/// Token provider with a scripted silent-acquisition outcome.
pub struct ScriptedTokens {
    pub silent: Result<AccessToken, TokenError>,
    pub interactive_calls: AtomicUsize,
}

impl ScriptedTokens {
    pub fn ok(token: &str) -> Self {
        Self {
            silent: Ok(AccessToken::new(token)),
            interactive_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: TokenError) -> Self {
        Self {
            silent: Err(error),
            interactive_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenProvider for ScriptedTokens {
    async fn acquire_token_silent(&self) -> Result<AccessToken, TokenError> {
        self.silent.clone()
    }

    async fn begin_interactive_login(&self) -> Result<(), TokenError> {
        self.interactive_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build a client against `base_url` with the given collaborators.
pub fn client(
    base_url: &str,
    tokens: Arc<ScriptedTokens>,
    handler: Arc<CountingHandler>,
) -> ResourceClient {
    ResourceClient::new(base_url, tokens, handler).unwrap()
}
