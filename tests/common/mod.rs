//! Shared utilities for integration testing.
#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::{Form, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use auth_proxy::config::{AuthMode, ProxyConfig};
use auth_proxy::{CredentialManager, HttpServer, Shutdown};

/// How the mock upstream decides whether a request is authenticated.
#[derive(Debug, Clone)]
pub enum MockAuth {
    /// Requires a `kiwisessionid` cookie issued by `/auth/login`.
    Session,
    /// Requires this exact `Authorization` header value.
    Basic(&'static str),
    /// Accepts everything.
    Open,
}

/// A request as the upstream received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn cookie(&self) -> Option<&str> {
        self.headers.get(header::COOKIE).and_then(|v| v.to_str().ok())
    }
}

pub struct MockState {
    pub auth: MockAuth,
    pub login_status: AtomicU16,
    logins: AtomicUsize,
    issued: AtomicUsize,
    valid_sessions: Mutex<HashSet<String>>,
    login_forms: Mutex<Vec<HashMap<String, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn new(auth: MockAuth) -> Self {
        Self {
            auth,
            login_status: AtomicU16::new(200),
            logins: AtomicUsize::new(0),
            issued: AtomicUsize::new(0),
            valid_sessions: Mutex::new(HashSet::new()),
            login_forms: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn login_forms(&self) -> Vec<HashMap<String, String>> {
        self.login_forms.lock().unwrap().clone()
    }

    pub fn set_login_status(&self, status: u16) {
        self.login_status.store(status, Ordering::SeqCst);
    }

    /// Invalidate every session issued so far.
    pub fn expire_sessions(&self) {
        self.valid_sessions.lock().unwrap().clear();
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn session_is_valid(&self, headers: &HeaderMap) -> bool {
        let sessions = self.valid_sessions.lock().unwrap();
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == "kiwisessionid" && sessions.contains(value))
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        match &self.auth {
            MockAuth::Session => self.session_is_valid(headers),
            MockAuth::Basic(expected) => headers
                .get(header::AUTHORIZATION)
                .map(|v| v == *expected)
                .unwrap_or(false),
            MockAuth::Open => true,
        }
    }
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a programmable upstream API on an ephemeral port.
///
/// Routes:
/// - `POST /auth/login`: issues `kiwisessionid=session-N`
/// - `/always-401`: rejects every request
/// - `/redirect`: 302 to `/elsewhere`
/// - `/status/{code}`: answers with that status
/// - `/echo`: returns the request body and content type
/// - `/multi`: two `Set-Cookie` headers
/// - anything else: `{"ok":true}`
pub async fn start_mock_upstream(auth: MockAuth) -> MockUpstream {
    let state = Arc::new(MockState::new(auth));
    let app = Router::new()
        .route("/auth/login", post(login))
        .fallback(api)
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, state }
}

async fn login(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.logins.fetch_add(1, Ordering::SeqCst);
    state.login_forms.lock().unwrap().push(form);

    let status = StatusCode::from_u16(state.login_status.load(Ordering::SeqCst)).unwrap();
    if !matches!(status.as_u16(), 200 | 302 | 303) {
        return (status, "invalid credentials").into_response();
    }

    let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("session-{}", n);
    state.valid_sessions.lock().unwrap().insert(token.clone());

    let mut response = (status, "logged in").into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&format!("kiwisessionid={}; Path=/; HttpOnly", token)).unwrap(),
    );
    if status.is_redirection() {
        response
            .headers_mut()
            .insert(header::LOCATION, HeaderValue::from_static("/"));
    }
    response
}

async fn api(State(state): State<Arc<MockState>>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let recorded = RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers.clone(),
        body: body.clone(),
    };
    state.requests.lock().unwrap().push(recorded);

    let path = parts.uri.path();
    if path == "/always-401" || !state.is_authorized(&parts.headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }

    if path == "/redirect" {
        return (StatusCode::FOUND, [(header::LOCATION, "/elsewhere")], "").into_response();
    }

    if let Some(code) = path.strip_prefix("/status/") {
        let status = StatusCode::from_u16(code.parse().unwrap()).unwrap();
        return (status, format!("status {}", code)).into_response();
    }

    if path == "/echo" {
        let mut response = Response::new(Body::from(body));
        if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type.clone());
        }
        return response;
    }

    if path == "/multi" {
        let mut response = "multi".into_response();
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        response
            .headers_mut()
            .append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        return response;
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::HeaderName::from_static("x-upstream"), "mock"),
        ],
        r#"{"ok":true}"#,
    )
        .into_response()
}

/// Start a raw TCP upstream that answers every connection with `response`.
pub async fn start_raw_upstream(response: impl Into<Vec<u8>>) -> SocketAddr {
    let response = Arc::new(response.into());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_silent_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Proxy configuration pointing at `base_url`.
pub fn proxy_config(base_url: &str, mode: AuthMode) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.service_name = "test-proxy".into();
    config.upstream.base_url = base_url.to_string();
    config.upstream.auth_mode = Some(mode);
    config.upstream.connect_timeout_secs = 2;
    config.upstream.request_timeout_secs = 5;
    config.upstream.login_timeout_secs = 5;
    if mode != AuthMode::None {
        config.upstream.password = Some("secret".into());
    }
    config
}

/// A proxy running on an ephemeral port; shuts down on drop.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub credentials: Arc<CredentialManager>,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let server = HttpServer::new(config).unwrap();
    let credentials = server.credentials().clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningProxy {
        addr,
        credentials,
        shutdown,
    }
}

/// Test client: no system proxy, redirects not followed.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
