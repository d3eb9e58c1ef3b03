//! OAuth2 access tokens for Google APIs.
//!
//! A token comes either from configuration (a static token, typically from
//! `gcloud auth print-access-token` during local runs) or from the metadata
//! server that Cloud Functions, Cloud Run, and GCE expose to workloads.

use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use gb_core::config::CredentialsConfig;
use gb_core::error::{GbError, GbResult};

use crate::client::HttpClient;

/// A bearer token. Tokens are fetched per invocation and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
}

/// Where access tokens come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenSource {
    /// A fixed token supplied by configuration.
    Static(String),
    /// The instance metadata server.
    Metadata { url: String },
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl AccessTokenSource {
    /// Choose the source from configuration: a non-empty static token wins.
    pub fn from_config(config: &CredentialsConfig) -> Self {
        if config.access_token.is_empty() {
            AccessTokenSource::Metadata {
                url: config.metadata_endpoint.clone(),
            }
        } else {
            AccessTokenSource::Static(config.access_token.clone())
        }
    }

    /// Obtain a token. `http` must not carry a bearer token of its own.
    pub async fn fetch(&self, http: &HttpClient) -> GbResult<AccessToken> {
        match self {
            AccessTokenSource::Static(token) => Ok(AccessToken {
                token: token.clone(),
            }),
            AccessTokenSource::Metadata { url } => {
                debug!("requesting access token from metadata server");
                let request = http
                    .request(Method::GET, url)
                    .header("Metadata-Flavor", "Google");

                let response = http.execute(request).await.map_err(|e| {
                    GbError::AuthFailed(format!("metadata server unreachable: {e}"))
                })?;
                let response = HttpClient::check_status(response).await.map_err(|e| {
                    GbError::AuthFailed(format!("metadata server refused token request: {e}"))
                })?;
                let token: MetadataToken = HttpClient::parse_json(response).await?;

                if token.access_token.is_empty() {
                    return Err(GbError::AuthFailed("metadata server returned an empty token".into()));
                }

                Ok(AccessToken {
                    token: token.access_token,
                })
            }
        }
    }
}
