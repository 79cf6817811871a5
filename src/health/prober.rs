//! Session health probing.
//!
//! # Responsibilities
//! - Answer "is my session usable" before long credential-sensitive work
//! - Share one in-flight probe between concurrent callers
//! - Skip the network entirely within the cooldown window
//!
//! # Design Decisions
//! - Probe runs as a spawned task, so it completes even if every caller goes away
//! - Completion is recorded by a drop guard, so a panicking or aborted probe
//!   still clears the in-flight slot
//! - Probe requests go through the coordinator, which may refresh and replay once
//! - A failed attempt is followed by fresh attempts up to `attempts` in total
//! - Inside the cooldown the answer is optimistically `true`

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use crate::config::SessionConfig;
use crate::http::request::RequestDescriptor;
use crate::http::transport::Transport;
use crate::observability::metrics;
use crate::session::coordinator::RefreshCoordinator;

type SharedProbe = Shared<BoxFuture<'static, bool>>;

/// Probe endpoint and pacing.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub path: String,
    pub cooldown: Duration,
    pub attempts: u32,
}

impl From<&SessionConfig> for ProbeConfig {
    fn from(session: &SessionConfig) -> Self {
        Self {
            path: session.probe_path.clone(),
            cooldown: session.probe_cooldown(),
            attempts: session.probe_attempts,
        }
    }
}

#[derive(Default)]
struct ProbeState {
    in_flight: Option<SharedProbe>,
    last_completed: Option<Instant>,
}

/// Marks the probe finished when dropped, however the task ends.
struct ProbeCompletion {
    state: Arc<Mutex<ProbeState>>,
}

impl Drop for ProbeCompletion {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.in_flight = None;
        state.last_completed = Some(Instant::now());
    }
}

/// Cooldown-gated, de-duplicated session check.
pub struct SessionProber<T: Transport> {
    coordinator: Arc<RefreshCoordinator<T>>,
    config: ProbeConfig,
    state: Arc<Mutex<ProbeState>>,
}

impl<T: Transport> SessionProber<T> {
    pub fn new(coordinator: Arc<RefreshCoordinator<T>>, config: ProbeConfig) -> Self {
        Self {
            coordinator,
            config,
            state: Arc::new(Mutex::new(ProbeState::default())),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn probe_in_flight(&self) -> bool {
        lock(&self.state).in_flight.is_some()
    }

    /// True if the session is usable, possibly after a transparent refresh.
    pub async fn check_session(&self) -> bool {
        let probe = {
            let mut state = lock(&self.state);
            if let Some(probe) = &state.in_flight {
                metrics::record_probe("joined");
                probe.clone()
            } else if state
                .last_completed
                .is_some_and(|at| at.elapsed() < self.config.cooldown)
            {
                tracing::debug!("Session probe skipped, within cooldown");
                metrics::record_probe("skipped");
                return true;
            } else {
                let probe = self.start_probe();
                state.in_flight = Some(probe.clone());
                probe
            }
        };
        probe.await
    }

    // Caller holds the state lock, so the task cannot clear `in_flight`
    // before it has been stored.
    fn start_probe(&self) -> SharedProbe {
        let coordinator = self.coordinator.clone();
        let config = self.config.clone();
        let completion = ProbeCompletion {
            state: self.state.clone(),
        };

        let task = tokio::spawn(async move {
            let _completion = completion;
            run_probe(&coordinator, &config).await
        });

        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Session probe task failed");
                false
            })
        })
        .boxed()
        .shared()
    }
}

async fn run_probe<T: Transport>(
    coordinator: &RefreshCoordinator<T>,
    config: &ProbeConfig,
) -> bool {
    let attempts = config.attempts.max(1);
    for attempt in 1..=attempts {
        match coordinator.execute(RequestDescriptor::get(&config.path)).await {
            Ok(_) => {
                tracing::debug!(attempt, "Session probe succeeded");
                metrics::record_probe("healthy");
                return true;
            }
            Err(e) => {
                tracing::warn!(attempt, attempts, error = %e, "Session probe failed");
            }
        }
    }
    metrics::record_probe("unhealthy");
    false
}

fn lock(state: &Mutex<ProbeState>) -> MutexGuard<'_, ProbeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
