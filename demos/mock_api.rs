//! Pretend remote API for trying `session-cli` by hand.
//!
//! Sessions expire a few seconds after login or refresh, and the refresh
//! endpoint accepts any caller, so every fresh `session-cli` process starts
//! with a 401 and goes through the refresh path.
//!
//! ```text
//! cargo run --example mock_api
//! session-cli --base-url http://127.0.0.1:8000/api burst /projects -n 16
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{extract::State, Router};

const SESSION_TTL: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Sessions {
    current: Mutex<Option<(String, Instant)>>,
    issued: Mutex<u64>,
}

impl Sessions {
    fn issue(&self) -> String {
        let mut issued = self.issued.lock().unwrap();
        *issued += 1;
        let token = format!("demo-{}", *issued);
        *self.current.lock().unwrap() = Some((token.clone(), Instant::now() + SESSION_TTL));
        token
    }

    fn accepts(&self, headers: &HeaderMap) -> bool {
        let presented = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').map(str::trim).find_map(|c| c.strip_prefix("session=")))
            .map(str::to_string);
        match (&*self.current.lock().unwrap(), presented) {
            (Some((token, expires)), Some(presented)) => {
                *token == presented && Instant::now() < *expires
            }
            _ => false,
        }
    }
}

fn with_session_cookie(token: &str, body: &'static str) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&format!("session={token}; Path=/")) {
        headers.append(header::SET_COOKIE, v);
    }
    headers.append(header::SET_COOKIE, HeaderValue::from_static("refresh=demo-refresh; Path=/"));
    (StatusCode::OK, headers, body).into_response()
}

#[tokio::main]
async fn main() {
    let sessions = Arc::new(Sessions::default());

    let app = Router::new()
        .route(
            "/api/auth/login",
            post(|State(s): State<Arc<Sessions>>| async move {
                with_session_cookie(&s.issue(), "logged in")
            }),
        )
        .route(
            "/api/auth/refresh",
            post(|State(s): State<Arc<Sessions>>| async move {
                println!("refresh exchange");
                with_session_cookie(&s.issue(), "refreshed")
            }),
        )
        .route(
            "/api/auth/test",
            get(|State(s): State<Arc<Sessions>>, headers: HeaderMap| async move {
                if s.accepts(&headers) {
                    StatusCode::OK
                } else {
                    StatusCode::UNAUTHORIZED
                }
            }),
        )
        .route(
            "/api/projects",
            get(|State(s): State<Arc<Sessions>>, headers: HeaderMap| async move {
                if s.accepts(&headers) {
                    (StatusCode::OK, r#"[{"id":1,"name":"north-field"}]"#).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        )
        .with_state(sessions);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    println!("Mock API listening on http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
