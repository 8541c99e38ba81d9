//! Local stand-in for the upstream API.
//!
//! Serves a form login at `POST /auth/login` that issues a `kiwisessionid`
//! cookie, and a few endpoints that require it. Sessions expire after
//! `SESSION_TTL` so the proxy's refresh path can be watched in the logs.
//!
//! ```text
//! cargo run --example mock_upstream
//! UPSTREAM_PASSWORD=demo cargo run
//! curl localhost:8080/devices
//! ```

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

const ADDR: &str = "127.0.0.1:8081";
const SESSION_TTL: Duration = Duration::from_secs(60);
const PASSWORD: &str = "demo";

#[derive(Default)]
struct Sessions {
    issued: Mutex<HashMap<String, Instant>>,
}

impl Sessions {
    fn issue(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        if let Ok(mut issued) = self.issued.lock() {
            issued.insert(token.clone(), Instant::now());
        }
        token
    }

    fn is_valid(&self, headers: &HeaderMap) -> bool {
        let Ok(issued) = self.issued.lock() else {
            return false;
        };
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == "kiwisessionid")
            .any(|(_, value)| {
                issued
                    .get(value)
                    .map(|at| at.elapsed() < SESSION_TTL)
                    .unwrap_or(false)
            })
    }
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(sessions): State<Arc<Sessions>>, Form(form): Form<LoginForm>) -> Response {
    if form.password != PASSWORD {
        tracing::warn!(username = %form.username, "Login rejected");
        return (StatusCode::FORBIDDEN, "invalid credentials").into_response();
    }

    let token = sessions.issue();
    tracing::info!(username = %form.username, "Session issued");
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, format!("kiwisessionid={}; Path=/; HttpOnly", token)),
        ],
    )
        .into_response()
}

async fn devices(State(sessions): State<Arc<Sessions>>, headers: HeaderMap) -> Response {
    if !sessions.is_valid(&headers) {
        return (StatusCode::UNAUTHORIZED, "session required").into_response();
    }
    Json(serde_json::json!([
        {"id": 1, "name": "pump-1", "online": true},
        {"id": 2, "name": "valve-7", "online": false},
    ]))
    .into_response()
}

async fn status(State(sessions): State<Arc<Sessions>>, headers: HeaderMap) -> Response {
    if !sessions.is_valid(&headers) {
        return (StatusCode::UNAUTHORIZED, "session required").into_response();
    }
    Json(serde_json::json!({"uptime": "ok"})).into_response()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/devices", get(devices))
        .route("/status", get(status))
        .with_state(Arc::new(Sessions::default()));

    let listener = tokio::net::TcpListener::bind(ADDR).await?;
    tracing::info!(address = ADDR, "Mock upstream listening");
    axum::serve(listener, app).await?;
    Ok(())
}
