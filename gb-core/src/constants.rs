//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "gatrabali";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

/// User document field mapping device tokens to opaque values.
pub const FCM_TOKENS_FIELD: &str = "fcm_tokens";

/// Default Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Default Firestore database name.
pub const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";

/// Default FCM HTTP v1 endpoint.
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Default metadata server token URL (GCE, Cloud Functions, Cloud Run).
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Default request timeout for outgoing HTTP calls, in milliseconds.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Environment variable holding a static OAuth2 access token.
pub const ENV_ACCESS_TOKEN: &str = "GB_ACCESS_TOKEN";

/// Environment variables holding the Google Cloud project id, in lookup order.
pub const ENV_PROJECT_IDS: &[&str] = &["GOOGLE_CLOUD_PROJECT", "GCP_PROJECT"];

/// Android notification defaults.
pub mod android {
    /// Small icon shown with every notification.
    pub const ICON_URL: &str = "https://firebasestorage.googleapis.com/v0/b/gatrabali.appspot.com/o/app%2Fnotification.png?alt=media&token=b76afe54-fc9c-4a05-addb-3f9eaaee7d2f";

    /// Accent color applied to the icon.
    pub const COLOR: &str = "#4CB050";
}

/// Sync payload `type` values.
pub mod sync_types {
    pub const CATEGORY: &str = "category";
    pub const FEED: &str = "feed";
    pub const ENTRY: &str = "entry";

    /// All known sync types.
    pub const ALL: &[&str] = &[CATEGORY, FEED, ENTRY];
}
