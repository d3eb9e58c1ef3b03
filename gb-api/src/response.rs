//! Google API error responses.
//!
//! Google REST APIs report failures with a common envelope:
//! ```json
//! { "error": { "code": 404, "message": "...", "status": "NOT_FOUND",
//!              "details": [{ "@type": "...FcmError", "errorCode": "UNREGISTERED" }] } }
//! ```

use serde::Deserialize;

/// Parsed error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Canonical status name, e.g. "NOT_FOUND".
    pub canonical: Option<String>,
    /// Service-specific error code from the details, e.g. "UNREGISTERED".
    pub error_code: Option<String>,
    /// Human-readable message (falls back to the raw body).
    pub message: String,
}

#[derive(Deserialize)]
struct Envelope {
    error: Status,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<Detail>,
}

#[derive(Deserialize)]
struct Detail {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl ApiError {
    /// Parse an error body. Bodies that are not the Google envelope are kept
    /// verbatim as the message.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Envelope>(body) {
            Ok(Envelope { error }) => Self {
                status,
                canonical: error.status,
                error_code: error.details.into_iter().find_map(|d| d.error_code),
                message: error.message,
            },
            Err(_) => Self {
                status,
                canonical: None,
                error_code: None,
                message: body.trim().to_string(),
            },
        }
    }

    /// Most specific code available: the detail error code, else the canonical status.
    pub fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.canonical.as_deref())
    }
}
