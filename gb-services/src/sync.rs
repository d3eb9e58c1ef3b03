//! Routing of sync payloads to the external sync routines.
//!
//! The routines themselves live outside this workspace. `SyncRoutines` is
//! the seam; `HttpSyncRoutines` forwards each call to a remote sync service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use gb_api::{AccessTokenSource, HttpClient};
use gb_core::config::{AppConfig, CredentialsConfig};
use gb_core::error::{GbError, GbResult};
use gb_models::{DocumentStore, SyncPayload, SyncType};

/// The external sync routines, one per resource type.
#[async_trait]
pub trait SyncRoutines: Send + Sync {
    async fn start_category_sync(&self, store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()>;

    async fn start_feed_sync(&self, store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()>;

    async fn start_entry_sync(&self, store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()>;
}

/// Routes a validated payload to the routine for its type.
#[derive(Clone)]
pub struct SyncDispatcher {
    routines: Arc<dyn SyncRoutines>,
}

impl SyncDispatcher {
    pub fn new(routines: Arc<dyn SyncRoutines>) -> Self {
        Self { routines }
    }

    /// Call exactly one routine, or none for an unknown type.
    ///
    /// The routine's result is returned as is.
    pub async fn dispatch(
        &self,
        store: &dyn DocumentStore,
        sync_type: &SyncType,
        payload: &SyncPayload,
    ) -> GbResult<()> {
        match sync_type {
            SyncType::Category => self.routines.start_category_sync(store, payload).await,
            SyncType::Feed => self.routines.start_feed_sync(store, payload).await,
            SyncType::Entry => self.routines.start_entry_sync(store, payload).await,
            SyncType::Unknown(kind) => {
                debug!("ignoring sync payload with unknown type {kind:?}");
                Ok(())
            }
        }
    }
}

/// Forwards sync requests to a remote sync service.
///
/// Each call POSTs the payload as JSON to `{endpoint}/{type}`. The remote
/// service owns its own store access, so the store client is not used.
/// An unset endpoint is reported by the first forwarded call.
pub struct HttpSyncRoutines {
    endpoint: String,
    timeout_ms: u64,
    credentials: CredentialsConfig,
}

impl HttpSyncRoutines {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.sync.endpoint.trim().trim_end_matches('/').to_string(),
            timeout_ms: config.sync.timeout_ms,
            credentials: config.credentials.clone(),
        }
    }

    pub fn route_url(&self, sync_type: &SyncType) -> GbResult<String> {
        if self.endpoint.is_empty() {
            return Err(GbError::MissingConfig("sync.endpoint".into()));
        }
        Ok(format!("{}/{}", self.endpoint, sync_type.as_str()))
    }

    async fn forward(&self, sync_type: SyncType, payload: &SyncPayload) -> GbResult<()> {
        let url = self.route_url(&sync_type)?;
        let http = HttpClient::new(self.timeout_ms)?;
        let token = AccessTokenSource::from_config(&self.credentials)
            .fetch(&http)
            .await?;
        let http = http.with_bearer(token.token);

        info!("forwarding {sync_type} sync to {url}");
        http.post(&url, payload)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                GbError::Http(msg) | GbError::Timeout(msg) => {
                    GbError::Sync(format!("{sync_type} sync unreachable: {msg}"))
                }
                other => other,
            })
    }
}

#[async_trait]
impl SyncRoutines for HttpSyncRoutines {
    async fn start_category_sync(&self, _store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()> {
        self.forward(SyncType::Category, payload).await
    }

    async fn start_feed_sync(&self, _store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()> {
        self.forward(SyncType::Feed, payload).await
    }

    async fn start_entry_sync(&self, _store: &dyn DocumentStore, payload: &SyncPayload) -> GbResult<()> {
        self.forward(SyncType::Entry, payload).await
    }
}
