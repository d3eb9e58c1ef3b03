//! Sync and push notification payloads carried by trigger messages.

use std::collections::BTreeMap;
use serde::{Deserialize, Deserializer, Serialize};

use gb_core::constants::sync_types;
use gb_core::error::{GbError, GbResult};

/// Describes which external resource changed and how.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Identifier of the changed resource (any JSON value).
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Resource type: "category", "feed", or "entry".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Operation on the resource.
    #[serde(default)]
    pub op: Option<String>,
}

/// Known sync resource types plus a fallthrough for anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncType {
    Category,
    Feed,
    Entry,
    /// A type this version does not know about.
    Unknown(String),
}

impl SyncType {
    /// Wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            SyncType::Category => sync_types::CATEGORY,
            SyncType::Feed => sync_types::FEED,
            SyncType::Entry => sync_types::ENTRY,
            SyncType::Unknown(s) => s,
        }
    }
}

impl From<&str> for SyncType {
    fn from(s: &str) -> Self {
        match s {
            sync_types::CATEGORY => SyncType::Category,
            sync_types::FEED => SyncType::Feed,
            sync_types::ENTRY => SyncType::Entry,
            other => SyncType::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for SyncType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncPayload {
    /// Decode a payload from message bytes.
    pub fn decode(bytes: &[u8]) -> GbResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check that id, type, and op are all present and resolve the type.
    pub fn validate(&self) -> GbResult<SyncType> {
        match (&self.id, &self.kind, &self.op) {
            (Some(_), Some(kind), Some(_)) => Ok(SyncType::from(kind.as_str())),
            _ => Err(GbError::InvalidPayload(
                "invalid message payload: missing id, type or op".into(),
            )),
        }
    }
}

/// Describes a notification to deliver to one user's devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushNotificationPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Arbitrary key/value data delivered with the notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    /// Android collapse key; empty means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
}

impl PushNotificationPayload {
    /// Decode a payload from message bytes.
    pub fn decode(bytes: &[u8]) -> GbResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check that user_id, title, and body are all non-empty.
    pub fn validate(&self) -> GbResult<()> {
        if self.user_id.is_empty() || self.title.is_empty() || self.body.is_empty() {
            return Err(GbError::InvalidPayload(
                "invalid message payload: missing user_id, title or body".into(),
            ));
        }
        Ok(())
    }

    /// The collapse key, if one was given and is non-empty.
    pub fn collapse_key(&self) -> Option<&str> {
        self.collapse_key.as_deref().filter(|k| !k.is_empty())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
