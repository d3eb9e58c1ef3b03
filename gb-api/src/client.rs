//! Shared HTTP client for Google REST APIs.
//!
//! Wraps reqwest::Client with bearer authentication, a per-request timeout,
//! and the mapping from transport and status failures to `GbError`. Requests
//! are sent exactly once.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use gb_core::error::{GbError, GbResult};

use crate::response::ApiError;

/// HTTP client used by every service client in this crate.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    /// OAuth2 bearer token attached to every request, if any.
    bearer: Option<String>,
    /// Default request timeout.
    timeout: Duration,
}

impl HttpClient {
    /// Create a client with the given request timeout and no credentials.
    pub fn new(timeout_ms: u64) -> GbResult<Self> {
        let timeout = Duration::from_millis(timeout_ms);
        let inner = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GbError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            bearer: None,
            timeout,
        })
    }

    /// Attach a bearer token to every request made by this client.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Start a request with authentication and timeout applied.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.inner.request(method, url).timeout(self.timeout);
        match &self.bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request, mapping transport failures. The status is not checked.
    pub async fn execute(&self, builder: RequestBuilder) -> GbResult<Response> {
        builder.send().await.map_err(Self::classify_error)
    }

    /// POST a JSON body and require a success status.
    pub async fn post<B: serde::Serialize + ?Sized>(&self, url: &str, body: &B) -> GbResult<Response> {
        debug!("POST {url}");
        let response = self.execute(self.request(Method::POST, url).json(body)).await?;
        Self::check_status(response).await
    }

    /// Map a non-success response to an error, passing successes through.
    pub async fn check_status(response: Response) -> GbResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_body(status.as_u16(), &body);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GbError::AuthFailed(format!("server returned {status}: {}", err.message)));
        }

        Err(GbError::ServerError {
            status: status.as_u16(),
            message: err.message,
        })
    }

    /// Deserialize a JSON response body.
    pub async fn parse_json<T: DeserializeOwned>(response: Response) -> GbResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| GbError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Classify a reqwest error into a GbError variant.
    pub fn classify_error(e: reqwest::Error) -> GbError {
        if e.is_timeout() {
            GbError::Timeout(e.to_string())
        } else if e.is_connect() {
            GbError::Http(format!("connection failed: {e}"))
        } else {
            GbError::Http(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_sends_no_authorization() {
        let client = HttpClient::new(5_000).unwrap();
        let request = client
            .request(Method::GET, "https://example.com/v1/thing")
            .build()
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
    }

    #[test]
    fn test_bearer_is_applied() {
        let client = HttpClient::new(5_000).unwrap().with_bearer("ya29.abc");

        let request = client
            .request(Method::GET, "https://example.com/v1/thing")
            .build()
            .unwrap();
        let auth = request.headers().get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer ya29.abc");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(5)));
    }
}
