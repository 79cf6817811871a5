//! Shared mock remote API for integration tests.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

pub const REFRESH_TOKEN: &str = "refresh-token";

/// Server-side session state the tests can steer.
#[derive(Default)]
pub struct MockApiState {
    session: Mutex<Option<String>>,
    generation: AtomicU64,
    refresh_denied: AtomicBool,
    refresh_delay_ms: AtomicU64,
    pub refresh_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
    pub resource_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockApiState {
    /// Invalidate the current session cookie.
    pub fn expire_session(&self) {
        *self.session.lock().unwrap() = None;
    }

    pub fn deny_refresh(&self, denied: bool) {
        self.refresh_denied.store(denied, Ordering::SeqCst);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.refresh_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn issue_session(&self) -> String {
        let token = format!("s-{}", self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        *self.session.lock().unwrap() = Some(token.clone());
        token
    }

    fn is_valid(&self, headers: &HeaderMap) -> bool {
        let current = self.session.lock().unwrap().clone();
        match (current, cookie(headers, "session")) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

fn set_cookie(headers: &mut HeaderMap, name: &str, value: &str) {
    if let Ok(v) = HeaderValue::from_str(&format!("{name}={value}; Path=/")) {
        headers.append(header::SET_COOKIE, v);
    }
}

async fn login(State(state): State<Arc<MockApiState>>) -> Response {
    let token = state.issue_session();
    let mut headers = HeaderMap::new();
    set_cookie(&mut headers, "session", &token);
    set_cookie(&mut headers, "refresh", REFRESH_TOKEN);
    (StatusCode::OK, headers, "logged in").into_response()
}

async fn refresh(State(state): State<Arc<MockApiState>>, headers: HeaderMap) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let presented = cookie(&headers, "refresh");
    if state.refresh_denied.load(Ordering::SeqCst) || presented.as_deref() != Some(REFRESH_TOKEN) {
        return (StatusCode::UNAUTHORIZED, "refresh rejected").into_response();
    }

    let token = state.issue_session();
    let mut out = HeaderMap::new();
    set_cookie(&mut out, "session", &token);
    (StatusCode::OK, out, "refreshed").into_response()
}

async fn whoami(State(state): State<Arc<MockApiState>>, headers: HeaderMap) -> Response {
    state.probe_calls.fetch_add(1, Ordering::SeqCst);
    if state.is_valid(&headers) {
        (StatusCode::OK, r#"{"username":"pilot"}"#).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn project(
    State(state): State<Arc<MockApiState>>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> Response {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    if state.is_valid(&headers) {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            format!(r#"{{"id":{id},"name":"project-{id}"}}"#),
        )
            .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn broken() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response()
}

/// Start the mock API on an ephemeral port. Returns its base URL.
pub async fn start_mock_api() -> (String, Arc<MockApiState>) {
    let state = Arc::new(MockApiState::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/test", get(whoami))
        .route("/api/projects/{id}", get(project))
        .route("/api/broken", get(broken))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}/api"), state)
}
