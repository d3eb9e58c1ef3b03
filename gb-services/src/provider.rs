//! Client acquisition for one handler invocation.
//!
//! Handlers never hold clients across invocations. Each call asks the
//! provider for a fresh boxed client and drops it on return, which is the
//! only release step the clients need.

use async_trait::async_trait;
use tracing::debug;

use gb_api::{AccessTokenSource, DryRunMessenger, FcmClient, FirestoreClient, HttpClient};
use gb_core::config::{AppConfig, StoreBackend};
use gb_core::error::GbResult;
use gb_models::{DocumentStore, LocalStore, PushMessenger};

/// Supplies the clients a handler needs.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Acquire a document store client.
    async fn document_store(&self) -> GbResult<Box<dyn DocumentStore>>;

    /// Acquire a push messaging client.
    async fn messenger(&self) -> GbResult<Box<dyn PushMessenger>>;
}

/// Provider backed by the configured Google Cloud services.
///
/// Every acquisition fetches a fresh access token, so a long-lived provider
/// never hands out an expired credential.
#[derive(Debug, Clone)]
pub struct CloudProvider {
    config: AppConfig,
}

impl CloudProvider {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// HTTP client carrying a freshly fetched bearer token.
    async fn authorized_http(&self, timeout_ms: u64) -> GbResult<HttpClient> {
        let source = AccessTokenSource::from_config(&self.config.credentials);
        let http = HttpClient::new(timeout_ms)?;
        let token = source.fetch(&http).await?;
        Ok(http.with_bearer(token.token))
    }
}

#[async_trait]
impl ClientProvider for CloudProvider {
    async fn document_store(&self) -> GbResult<Box<dyn DocumentStore>> {
        let store = &self.config.store;
        match store.backend {
            StoreBackend::Sqlite => {
                let path = self.config.effective_sqlite_path()?;
                debug!("acquiring local document store at {}", path.display());
                Ok(Box::new(LocalStore::init(&path, store)?))
            }
            StoreBackend::Firestore => {
                let project_id = self.config.project_id()?;
                debug!("acquiring firestore client for project {project_id}");
                let http = self.authorized_http(store.timeout_ms).await?;
                let client = FirestoreClient::new(
                    http,
                    &store.firestore_endpoint,
                    project_id,
                    &store.firestore_database,
                )?;
                Ok(Box::new(client))
            }
        }
    }

    async fn messenger(&self) -> GbResult<Box<dyn PushMessenger>> {
        let push = &self.config.push;
        if push.dry_run {
            let project = if self.config.project.id.is_empty() {
                "local"
            } else {
                self.config.project.id.as_str()
            };
            debug!("acquiring dry-run messenger");
            return Ok(Box::new(DryRunMessenger::new(project)));
        }

        let project_id = self.config.project_id()?;
        debug!("acquiring FCM client for project {project_id}");
        let http = self.authorized_http(push.timeout_ms).await?;
        Ok(Box::new(FcmClient::new(http, &push.endpoint, project_id)))
    }
}
