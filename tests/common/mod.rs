// In-process stand-in for the judge service. Every request is recorded and
// answered by a caller supplied closure, so tests can script status codes,
// bodies, cookies and delays.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Uri};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Cookies sent with the request, by name.
    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.cookie
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .filter_map(|pair| {
                let (k, v) = pair.trim().split_once('=')?;
                Some((k.to_string(), v.to_string()))
            })
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub cookies: Vec<String>,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::text(status, body.to_string())
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            cookies: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.cookies.push(cookie.to_string());
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&RecordedRequest) -> MockResponse + Send + Sync;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        cookie: header_str(header::COOKIE),
        user_agent: header_str(header::USER_AGENT),
        body,
    };
    let reply = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let mut builder = Response::builder()
        .status(reply.status)
        .header(header::CONTENT_TYPE, "application/json");
    for cookie in &reply.cookies {
        builder = builder.header(header::SET_COOKIE, cookie.as_str());
    }
    builder.body(Body::from(reply.body)).unwrap()
}

pub struct MockJudge {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockJudge {
    /// Serve on an ephemeral port from a background thread with its own
    /// runtime; the blocking client under test runs on the test thread.
    pub fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        };
        let requests = Arc::clone(&state.requests);
        let app = Router::new().fallback(handle).with_state(state);

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().expect("mock judge failed to start");

        MockJudge { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Standard successful login answer with the given cookies.
pub fn login_ok(token: &str, token_id: &str) -> MockResponse {
    MockResponse::json(200, serde_json::json!({"message": "Successfully logged in"}))
        .with_cookie(&format!("Token={}; Path=/; HttpOnly", token))
        .with_cookie(&format!("TokenId={}; Path=/; HttpOnly", token_id))
}
