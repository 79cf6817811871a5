//! Drop-in authenticated API client.
//!
//! Callers issue requests as if sessions never expired; a stale session is
//! refreshed and the request replayed behind the scenes. The only visible
//! failure is the unrecoverable one, which also triggers the login redirect.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ClientConfig, SessionConfig};
use crate::error::ClientResult;
use crate::health::prober::{ProbeConfig, SessionProber};
use crate::http::request::RequestDescriptor;
use crate::http::response::ApiResponse;
use crate::http::transport::{HttpTransport, Transport};
use crate::session::coordinator::RefreshCoordinator;
use crate::session::redirect::LoginRedirect;

/// Cloneable handle; clones share one coordinator and one prober.
pub struct ApiClient<T: Transport = HttpTransport> {
    coordinator: Arc<RefreshCoordinator<T>>,
    prober: Arc<SessionProber<T>>,
}

impl<T: Transport> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            prober: self.prober.clone(),
        }
    }
}

impl ApiClient<HttpTransport> {
    /// Build the client over HTTP from a validated configuration.
    pub fn from_config(
        config: &ClientConfig,
        redirect: Arc<dyn LoginRedirect>,
    ) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config.api, &config.timeouts)?;
        tracing::debug!(base_url = %transport.base_url(), "API client created");
        Ok(Self::with_transport(transport, &config.session, redirect))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(
        transport: T,
        session: &SessionConfig,
        redirect: Arc<dyn LoginRedirect>,
    ) -> Self {
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::new(transport), session, redirect));
        let prober = Arc::new(SessionProber::new(
            coordinator.clone(),
            ProbeConfig::from(session),
        ));
        Self { coordinator, prober }
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator<T>> {
        &self.coordinator
    }

    pub async fn send(&self, request: RequestDescriptor) -> ClientResult<ApiResponse> {
        self.coordinator.execute(request).await
    }

    pub async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send(RequestDescriptor::get(path)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send(RequestDescriptor::delete(path)).await
    }

    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.get(path).await?.json()
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse> {
        self.send(RequestDescriptor::post(path).with_json(body)?).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse> {
        self.send(RequestDescriptor::put(path).with_json(body)?).await
    }

    /// Confirm the session before a long credential-sensitive operation.
    pub async fn session_healthy(&self) -> bool {
        self.prober.check_session().await
    }

    pub fn refresh_count(&self) -> u64 {
        self.coordinator.refresh_count()
    }

    pub fn pending_waiters(&self) -> usize {
        self.coordinator.pending_waiters()
    }
}
