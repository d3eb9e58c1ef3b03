//! Push messages and the messaging seam.
//!
//! The message shape follows the FCM HTTP v1 `Message` resource, restricted
//! to what the notification sender fills in.

use std::collections::BTreeMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gb_core::error::GbResult;

/// Cross-platform notification content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Android-specific notification content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidNotification {
    pub icon: String,
    pub color: String,
}

/// Android-specific delivery options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    pub notification: AndroidNotification,
}

/// A message addressed to a single device token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    pub notification: Notification,
    pub android: AndroidConfig,
}

/// Delivery receipt returned by the push service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Message resource name, e.g. `projects/p/messages/0:123`.
    pub name: String,
}

impl std::fmt::Display for SendReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sends one message to one device.
#[async_trait]
pub trait PushMessenger: Send + Sync {
    /// Send a single message; errors describe why this token was refused.
    async fn send(&self, message: &Message) -> GbResult<SendReceipt>;
}
