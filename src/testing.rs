//! In-memory remote API for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Semaphore;

use crate::error::{ClientError, ClientResult};
use crate::http::request::RequestDescriptor;
use crate::http::response::ApiResponse;
use crate::http::transport::Transport;
use crate::session::redirect::LoginRedirect;

pub const REFRESH_PATH: &str = "/auth/refresh";
pub const PROBE_PATH: &str = "/auth/test";
pub const BROKEN_PATH: &str = "/broken";

/// What the refresh endpoint does when called.
#[derive(Debug, Clone, Copy)]
pub enum RefreshOutcome {
    /// Accept and make the session valid.
    Grant,
    /// Accept but leave the session invalid.
    Hollow,
    /// Reject with the given status.
    Deny(StatusCode),
}

/// Scripted API: every non-refresh path answers 401 until the session is valid.
pub struct MockApi {
    session_valid: AtomicBool,
    refresh_outcome: Mutex<RefreshOutcome>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<HashMap<String, usize>>,
    panic_next: AtomicBool,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            session_valid: AtomicBool::new(false),
            refresh_outcome: Mutex::new(RefreshOutcome::Grant),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            panic_next: AtomicBool::new(false),
        }
    }

    pub fn set_session_valid(&self, valid: bool) {
        self.session_valid.store(valid, Ordering::SeqCst);
    }

    pub fn set_refresh_outcome(&self, outcome: RefreshOutcome) {
        *self.refresh_outcome.lock().unwrap() = outcome;
    }

    /// Park every call to `path` until `release` is called.
    pub fn hold(&self, path: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let parked and future calls to `path` through.
    pub fn release(&self, path: &str) {
        if let Some(gate) = self.gates.lock().unwrap().remove(path) {
            gate.close();
        }
    }

    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Make the next call panic inside the transport, after it is counted.
    pub fn panic_on_next_call(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockApi {
    async fn send(&self, request: &RequestDescriptor) -> ClientResult<ApiResponse> {
        let route = request.route().to_string();
        *self.calls.lock().unwrap().entry(route.clone()).or_default() += 1;
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("transport blew up on {route}");
        }

        let gate = self.gates.lock().unwrap().get(&route).cloned();
        if let Some(gate) = gate {
            let _ = gate.acquire().await;
        }

        let unauthorized = || ClientError::Unauthorized {
            method: request.method().clone(),
            path: request.path().to_string(),
        };

        if route == REFRESH_PATH {
            let outcome = *self.refresh_outcome.lock().unwrap();
            return match outcome {
                RefreshOutcome::Grant => {
                    self.set_session_valid(true);
                    Ok(ApiResponse::new(StatusCode::OK, "refreshed"))
                }
                RefreshOutcome::Hollow => Ok(ApiResponse::new(StatusCode::OK, "refreshed")),
                RefreshOutcome::Deny(status) if status == StatusCode::UNAUTHORIZED => {
                    Err(unauthorized())
                }
                RefreshOutcome::Deny(status) => Err(ClientError::Status {
                    method: request.method().clone(),
                    path: request.path().to_string(),
                    status,
                    body: "refresh rejected".into(),
                }),
            };
        }

        if route == BROKEN_PATH {
            return Err(ClientError::Status {
                method: request.method().clone(),
                path: request.path().to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".into(),
            });
        }

        if self.session_valid.load(Ordering::SeqCst) {
            Ok(ApiResponse::new(StatusCode::OK, route))
        } else {
            Err(unauthorized())
        }
    }
}

/// Counts redirects without acting on them.
#[derive(Debug, Default)]
pub struct CountingRedirect {
    count: AtomicUsize,
}

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self, _login_url: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Yield to other tasks until `condition` holds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
