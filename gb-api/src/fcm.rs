//! Firebase Cloud Messaging HTTP v1 client.
//!
//! One request per device token: `POST {endpoint}/v1/projects/{p}/messages:send`
//! with body `{"message": ...}`. Rejections keep the FCM error code so the
//! sender can tell a dead token from a transient failure.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, info};

use gb_core::error::{GbError, GbResult};
use gb_models::{Message, PushMessenger, SendReceipt};

use crate::client::HttpClient;
use crate::response::ApiError;

/// FCM client bound to one project.
#[derive(Clone)]
pub struct FcmClient {
    http: HttpClient,
    send_url: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a Message,
}

impl FcmClient {
    /// Create a client. `http` should already carry a bearer token.
    pub fn new(http: HttpClient, endpoint: &str, project_id: &str) -> Self {
        let send_url = format!(
            "{}/v1/projects/{}/messages:send",
            endpoint.trim_end_matches('/'),
            project_id
        );
        Self { http, send_url }
    }

    pub fn send_url(&self) -> &str {
        &self.send_url
    }
}

#[async_trait]
impl PushMessenger for FcmClient {
    async fn send(&self, message: &Message) -> GbResult<SendReceipt> {
        debug!("POST {}", self.send_url);
        let request = self
            .http
            .request(Method::POST, &self.send_url)
            .json(&SendRequest { message });
        let response = self.http.execute(request).await?;

        let status = response.status();
        if status.is_success() {
            return HttpClient::parse_json(response).await;
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_body(status.as_u16(), &body);
        if status.as_u16() == 401 {
            return Err(GbError::AuthFailed(err.message));
        }
        Err(GbError::PushRejected {
            status: err.status,
            code: err.code().map(str::to_string),
            message: err.message,
        })
    }
}

/// Messenger that logs instead of sending. Every message is accepted.
#[derive(Debug, Clone)]
pub struct DryRunMessenger {
    project_id: String,
}

impl DryRunMessenger {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl PushMessenger for DryRunMessenger {
    async fn send(&self, message: &Message) -> GbResult<SendReceipt> {
        let body = serde_json::to_string(&SendRequest { message })?;
        info!("dry run, not sending: {body}");
        Ok(SendReceipt {
            name: format!(
                "projects/{}/messages/dry-run-{}",
                self.project_id,
                uuid::Uuid::new_v4()
            ),
        })
    }
}
