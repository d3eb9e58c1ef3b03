//! Global error types for the Gatrabali functions.
//!
//! Every failure a handler can return is unified into a single `GbError`
//! enum with conversions from the underlying library errors. The invoking
//! runtime only ever sees success or failure; the variant exists for logs
//! and for callers that want to branch on the cause.

use thiserror::Error;

/// Convenience type alias for Results using GbError.
pub type GbResult<T> = Result<T, GbError>;

/// Unified error type for the Gatrabali functions.
#[derive(Error, Debug)]
pub enum GbError {
    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Payload errors --
    /// Message bytes could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Message decoded but required fields are missing or empty.
    #[error("{0}")]
    InvalidPayload(String),

    // -- Document store errors --
    /// SQLite database error.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// The requested document does not exist.
    #[error("document not found: {collection}/{id}")]
    DocumentNotFound {
        /// Collection that was queried.
        collection: String,
        /// Document identifier.
        id: String,
    },

    // -- Network errors --
    /// HTTP request failed before a response was received.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Remote service returned an error response.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// Could not obtain or use credentials.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    // -- Push errors --
    /// The push service refused a single message.
    #[error("push rejected (status {status}, code {}): {message}", .code.as_deref().unwrap_or("none"))]
    PushRejected {
        /// HTTP status code.
        status: u16,
        /// FCM error code (e.g. "UNREGISTERED") or the canonical status.
        code: Option<String>,
        /// Error message from the push service.
        message: String,
    },

    // -- Sync errors --
    /// An external sync routine failed.
    #[error("sync failed: {0}")]
    Sync(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GbError {
    /// Whether this error says the target device token is no longer valid.
    ///
    /// Only meaningful for `PushRejected`; every other variant is treated as
    /// a transient or unrelated failure.
    pub fn is_stale_token(&self) -> bool {
        match self {
            GbError::PushRejected { status, code, .. } => match code.as_deref() {
                Some("UNREGISTERED") | Some("SENDER_ID_MISMATCH") | Some("NOT_FOUND") => true,
                Some(_) => false,
                None => *status == 404,
            },
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GbError {
    fn from(e: serde_json::Error) -> Self {
        GbError::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for GbError {
    fn from(e: base64::DecodeError) -> Self {
        GbError::Serialization(format!("invalid base64 data: {e}"))
    }
}

impl From<toml::de::Error> for GbError {
    fn from(e: toml::de::Error) -> Self {
        GbError::Config(e.to_string())
    }
}
