//! Single-flight session refresh.
//!
//! # Responsibilities
//! - Intercept 401s that qualify for refresh (see `policy.rs`)
//! - Elect one driver to perform the refresh exchange
//! - Suspend every other failing request until the refresh settles
//! - Replay each suspended request exactly once, or fail it with the refresh error
//! - Navigate to the login surface once per failed refresh
//!
//! # State Transitions
//! ```text
//! Idle     → Refreshing: first qualifying 401 (caller becomes the driver)
//! Refreshing: further qualifying 401s join the pending queue
//! Refreshing → Idle: refresh settles; flag cleared and queue drained together
//! ```
//!
//! # Design Decisions
//! - Check-then-set of the in-flight flag happens under one lock
//! - One oneshot channel per waiter; the lock is never held across an await
//! - Replays go straight to the transport, so a second 401 is terminal
//! - A driver dropped mid-refresh still settles the queue (SettleGuard)

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::config::SessionConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::request::RequestDescriptor;
use crate::http::response::ApiResponse;
use crate::http::transport::Transport;
use crate::observability::metrics;
use crate::session::policy::RetryPolicy;
use crate::session::queue::PendingQueue;
use crate::session::redirect::LoginRedirect;

type Verdict = Result<(), ClientError>;

/// A request suspended behind the in-flight refresh.
struct Waiter {
    path: String,
    tx: oneshot::Sender<Verdict>,
}

struct RefreshState {
    in_flight: bool,
    waiters: PendingQueue<Waiter>,
}

enum Role {
    Driver,
    Waiter(oneshot::Receiver<Verdict>),
}

/// Routes requests through a transport and recovers expired sessions.
pub struct RefreshCoordinator<T: Transport> {
    transport: Arc<T>,
    policy: RetryPolicy,
    login_url: String,
    redirect: Arc<dyn LoginRedirect>,
    state: Mutex<RefreshState>,
    refreshes: AtomicU64,
    #[cfg(test)]
    resolved: Mutex<Vec<String>>,
}

impl<T: Transport> RefreshCoordinator<T> {
    pub fn new(
        transport: Arc<T>,
        session: &SessionConfig,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        Self {
            transport,
            policy: RetryPolicy::new(session.refresh_path.clone()),
            login_url: session.login_url.clone(),
            redirect,
            state: Mutex::new(RefreshState {
                in_flight: false,
                waiters: PendingQueue::new(),
            }),
            refreshes: AtomicU64::new(0),
            #[cfg(test)]
            resolved: Mutex::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// True while a refresh exchange is outstanding.
    pub fn refresh_in_flight(&self) -> bool {
        self.lock_state().in_flight
    }

    /// Requests currently suspended behind the refresh.
    pub fn pending_waiters(&self) -> usize {
        self.lock_state().waiters.len()
    }

    /// Refresh exchanges issued since construction.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Send `request`, transparently refreshing the session on a qualifying 401.
    pub async fn execute(&self, request: RequestDescriptor) -> ClientResult<ApiResponse> {
        match self.transport.send(&request).await {
            Err(err) if self.policy.should_coordinate(&request, &err) => {
                self.recover(request).await
            }
            outcome => outcome,
        }
    }

    async fn recover(&self, mut request: RequestDescriptor) -> ClientResult<ApiResponse> {
        // Set before anything else so the replay can never re-enter.
        request.mark_retried();

        match self.join_or_drive(&request) {
            Role::Waiter(verdict) => {
                tracing::debug!(
                    request_id = %request.id(),
                    path = %request.path(),
                    "Waiting for in-flight session refresh"
                );
                match verdict.await {
                    Ok(Ok(())) => self.replay(&request).await,
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(ClientError::RefreshAbandoned),
                }
            }
            Role::Driver => self.drive(request).await,
        }
    }

    fn join_or_drive(&self, request: &RequestDescriptor) -> Role {
        let mut state = self.lock_state();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(Waiter {
                path: request.path().to_string(),
                tx,
            });
            metrics::record_waiters(state.waiters.len());
            Role::Waiter(rx)
        } else {
            state.in_flight = true;
            Role::Driver
        }
    }

    async fn drive(&self, request: RequestDescriptor) -> ClientResult<ApiResponse> {
        tracing::info!(
            request_id = %request.id(),
            path = %request.path(),
            "Session rejected, refreshing"
        );

        let guard = SettleGuard {
            coordinator: self,
            settled: false,
        };
        let outcome = self.refresh().await;
        let waiters = guard.settle();

        match outcome {
            Ok(()) => {
                tracing::info!(waiters = waiters.len(), "Session refreshed, replaying requests");
                metrics::record_refresh("success");
                self.resolve_waiters(waiters, Ok(()));
                self.replay(&request).await
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    waiters = waiters.len(),
                    "Session refresh failed"
                );
                metrics::record_refresh("failure");
                let err = ClientError::RefreshFailed(Box::new(e));
                self.resolve_waiters(waiters, Err(err.clone()));
                metrics::record_login_redirect();
                self.redirect.redirect_to_login(&self.login_url);
                Err(err)
            }
        }
    }

    async fn refresh(&self) -> ClientResult<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        let exchange = RequestDescriptor::post(self.policy.refresh_path());
        self.transport.send(&exchange).await.map(|_| ())
    }

    async fn replay(&self, request: &RequestDescriptor) -> ClientResult<ApiResponse> {
        let outcome = self.transport.send(request).await;
        match &outcome {
            Ok(_) => metrics::record_replay("success"),
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(
                    request_id = %request.id(),
                    path = %request.path(),
                    "Replay still unauthorized"
                );
                metrics::record_replay("unauthorized");
            }
            Err(_) => metrics::record_replay("error"),
        }
        outcome
    }

    /// Hand `verdict` to every waiter, oldest first.
    fn resolve_waiters(&self, waiters: Vec<Waiter>, verdict: Verdict) {
        for waiter in waiters {
            tracing::trace!(path = %waiter.path, ok = verdict.is_ok(), "Resolving waiter");
            #[cfg(test)]
            self.resolved
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(waiter.path.clone());
            let _ = waiter.tx.send(verdict.clone());
        }
    }

    /// Clear the in-flight flag and take the queue in one critical section.
    fn take_waiters(&self) -> Vec<Waiter> {
        let mut state = self.lock_state();
        state.in_flight = false;
        let waiters: Vec<_> = state.waiters.drain().collect();
        metrics::record_waiters(0);
        waiters
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settles the refresh state even if the driver's future is dropped.
struct SettleGuard<'a, T: Transport> {
    coordinator: &'a RefreshCoordinator<T>,
    settled: bool,
}

impl<T: Transport> SettleGuard<'_, T> {
    fn settle(mut self) -> Vec<Waiter> {
        self.settled = true;
        self.coordinator.take_waiters()
    }
}

impl<T: Transport> Drop for SettleGuard<'_, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let waiters = self.coordinator.take_waiters();
        tracing::warn!(waiters = waiters.len(), "Session refresh abandoned");
        metrics::record_refresh("abandoned");
        self.coordinator.resolve_waiters(waiters, Err(ClientError::RefreshAbandoned));
    }
}
