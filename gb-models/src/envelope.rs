//! Pub/Sub trigger envelopes.
//!
//! Accepts both the bare message form delivered to background functions
//! (`{"data": "<base64>", "attributes": {...}}`) and the push-subscription
//! wrapper (`{"message": {...}, "subscription": "..."}`).

use std::borrow::Cow;
use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use gb_core::error::{GbError, GbResult};

/// A decoded Pub/Sub message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PubSubMessage {
    /// Message payload bytes (already base64-decoded).
    pub data: Vec<u8>,
    /// Message attributes.
    pub attributes: BTreeMap<String, String>,
    /// Server-assigned message id, if present.
    pub message_id: Option<String>,
    /// Publish time, if present.
    pub publish_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    attributes: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "message_id")]
    message_id: Option<String>,
    #[serde(default, alias = "publish_time")]
    publish_time: Option<String>,
}

#[derive(Deserialize)]
struct PushEnvelope {
    message: WireMessage,
    #[serde(default)]
    #[allow(dead_code)]
    subscription: Option<String>,
}

impl PubSubMessage {
    /// Wrap raw payload bytes without an envelope.
    pub fn from_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Parse an envelope in either the bare or the push-subscription form.
    pub fn from_slice(bytes: &[u8]) -> GbResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;

        let wire = if value.get("message").map_or(false, |m| m.is_object()) {
            serde_json::from_value::<PushEnvelope>(value)?.message
        } else if value.is_object() {
            serde_json::from_value::<WireMessage>(value)?
        } else {
            return Err(GbError::Serialization(
                "pub/sub envelope must be a JSON object".into(),
            ));
        };

        let data = match wire.data.as_deref() {
            Some(encoded) if !encoded.is_empty() => STANDARD.decode(encoded)?,
            _ => Vec::new(),
        };

        Ok(Self {
            data,
            attributes: wire.attributes.unwrap_or_default(),
            message_id: wire.message_id,
            publish_time: wire.publish_time,
        })
    }

    /// Payload as text for logging; invalid UTF-8 is replaced.
    pub fn payload_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(s: &str) -> String {
        STANDARD.encode(s)
    }

    #[test]
    fn test_bare_message() {
        let raw = serde_json::json!({
            "data": encode(r#"{"id":1,"type":"feed","op":"upsert"}"#),
            "attributes": {"origin": "miniflux"},
            "messageId": "123"
        });
        let msg = PubSubMessage::from_slice(raw.to_string().as_bytes()).unwrap();
        assert_eq!(msg.payload_lossy(), r#"{"id":1,"type":"feed","op":"upsert"}"#);
        assert_eq!(msg.attributes["origin"], "miniflux");
        assert_eq!(msg.message_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_push_wrapper() {
        let raw = serde_json::json!({
            "message": {
                "data": encode("hello"),
                "message_id": "42",
                "publish_time": "2019-07-01T00:00:00Z"
            },
            "subscription": "projects/p/subscriptions/s"
        });
        let msg = PubSubMessage::from_slice(raw.to_string().as_bytes()).unwrap();
        assert_eq!(msg.data, b"hello");
        assert_eq!(msg.message_id.as_deref(), Some("42"));
        assert_eq!(msg.publish_time.as_deref(), Some("2019-07-01T00:00:00Z"));
    }

    #[test]
    fn test_missing_data_is_empty() {
        let msg = PubSubMessage::from_slice(br#"{"attributes": {}}"#).unwrap();
        assert!(msg.data.is_empty());
    }

    #[test]
    fn test_bad_base64() {
        let err = PubSubMessage::from_slice(br#"{"data": "***"}"#).unwrap_err();
        assert!(matches!(err, GbError::Serialization(_)));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(PubSubMessage::from_slice(b"[1,2,3]").is_err());
        assert!(PubSubMessage::from_slice(b"garbage").is_err());
    }

    #[test]
    fn test_lossy_payload() {
        let msg = PubSubMessage::from_data(vec![0x66, 0xff, 0x6f]);
        assert_eq!(msg.payload_lossy(), "f\u{fffd}o");
    }
}
