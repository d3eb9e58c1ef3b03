//! Cloud Firestore REST client.
//!
//! Implements `DocumentStore` on top of the Firestore v1 REST API:
//! - get: `GET {root}/documents/{collection}/{id}`
//! - update field: `PATCH` with `updateMask.fieldPaths` and
//!   `currentDocument.exists=true`, so a missing document is an error rather
//!   than an implicit create.

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gb_core::error::{GbError, GbResult};
use gb_models::{Document, DocumentStore, FieldValue, Fields};

use crate::client::HttpClient;

/// Firestore client bound to one project and database.
#[derive(Clone)]
pub struct FirestoreClient {
    http: HttpClient,
    /// `{endpoint}/v1/projects/{project}/databases/{database}/documents`
    documents_root: Url,
}

/// Document as returned by the REST API.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: Fields,
    #[serde(default, skip_serializing)]
    update_time: Option<String>,
}

impl FirestoreClient {
    /// Create a client. `http` should already carry a bearer token.
    pub fn new(http: HttpClient, endpoint: &str, project_id: &str, database: &str) -> GbResult<Self> {
        let mut documents_root = Url::parse(endpoint)
            .map_err(|e| GbError::Config(format!("invalid firestore endpoint {endpoint}: {e}")))?;
        documents_root
            .path_segments_mut()
            .map_err(|_| GbError::Config(format!("firestore endpoint cannot be a base: {endpoint}")))?
            .pop_if_empty()
            .extend(["v1", "projects", project_id, "databases", database, "documents"]);

        Ok(Self { http, documents_root })
    }

    /// URL of a single document.
    pub fn document_url(&self, collection: &str, id: &str) -> Url {
        let mut url = self.documents_root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend([collection, id]);
        }
        url
    }

    fn not_found(collection: &str, id: &str) -> GbError {
        GbError::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_document(&self, collection: &str, id: &str) -> GbResult<Document> {
        let url = self.document_url(collection, id);
        debug!("GET {url}");

        let response = self.http.execute(self.http.request(Method::GET, url.as_str())).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Self::not_found(collection, id));
        }
        let response = HttpClient::check_status(response).await?;
        let doc: RestDocument = HttpClient::parse_json(response).await?;

        Ok(Document {
            id: id.to_string(),
            fields: doc.fields,
            update_time: doc.update_time,
        })
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: FieldValue,
    ) -> GbResult<()> {
        let mut url = self.document_url(collection, id);
        url.query_pairs_mut()
            .append_pair("updateMask.fieldPaths", &field_path(field))
            .append_pair("currentDocument.exists", "true");
        debug!("PATCH {url}");

        let mut fields = Fields::new();
        fields.insert(field.to_string(), value);
        let body = RestDocument {
            name: String::new(),
            fields,
            update_time: None,
        };

        let response = self
            .http
            .execute(self.http.request(Method::PATCH, url.as_str()).json(&body))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Self::not_found(collection, id));
        }
        HttpClient::check_status(response).await?;
        Ok(())
    }
}

/// Quote a field name for use in a field path when it is not a plain identifier.
fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        let http = HttpClient::new(1_000).unwrap();
        FirestoreClient::new(http, "https://firestore.googleapis.com", "gatrabali", "(default)").unwrap()
    }

    #[test]
    fn test_document_url() {
        let url = client().document_url("users", "abc123");
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/gatrabali/databases/(default)/documents/users/abc123"
        );
    }

    #[test]
    fn test_document_url_escapes_id() {
        let url = client().document_url("users", "a b/c");
        assert!(url.as_str().ends_with("/documents/users/a%20b%2Fc"));
    }

    #[test]
    fn test_emulator_endpoint_with_trailing_slash() {
        let http = HttpClient::new(1_000).unwrap();
        let client = FirestoreClient::new(http, "http://localhost:8080/", "demo", "(default)").unwrap();
        assert_eq!(
            client.document_url("users", "u").as_str(),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/users/u"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let http = HttpClient::new(1_000).unwrap();
        assert!(FirestoreClient::new(http, "not a url", "p", "(default)").is_err());
    }

    #[test]
    fn test_field_path_quoting() {
        assert_eq!(field_path("fcm_tokens"), "fcm_tokens");
        assert_eq!(field_path("fcm-tokens"), "`fcm-tokens`");
        assert_eq!(field_path("9lives"), "`9lives`");
        assert_eq!(field_path("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_rest_document_decode() {
        let body = r#"{
            "name": "projects/p/databases/(default)/documents/users/u1",
            "fields": {
                "fcm_tokens": {"mapValue": {"fields": {"tok": {"booleanValue": true}}}}
            },
            "createTime": "2019-01-01T00:00:00Z",
            "updateTime": "2019-02-01T00:00:00Z"
        }"#;
        let doc: RestDocument = serde_json::from_str(body).unwrap();
        assert_eq!(doc.update_time.as_deref(), Some("2019-02-01T00:00:00Z"));
        assert!(doc.fields["fcm_tokens"].as_map().unwrap().contains_key("tok"));
    }

    #[test]
    fn test_patch_body_shape() {
        let mut fields = Fields::new();
        fields.insert("fcm_tokens".into(), FieldValue::map(Fields::new()));
        let body = RestDocument {
            name: String::new(),
            fields,
            update_time: Some("ignored".into()),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"fields": {"fcm_tokens": {"mapValue": {"fields": {}}}}})
        );
    }
}
