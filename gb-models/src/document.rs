//! Documents and the user device-token field.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use gb_core::constants::FCM_TOKENS_FIELD;

use crate::value::{FieldValue, Fields};

/// A stored document: an identifier plus its typed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    /// Typed document fields.
    #[serde(default)]
    pub fields: Fields,
    /// Last update time reported by the store (RFC 3339), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Create a document with the given fields.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
            update_time: None,
        }
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Inspect the device-token field of a user document.
    pub fn fcm_tokens(&self) -> TokenField {
        TokenField::inspect(self.get(FCM_TOKENS_FIELD))
    }
}

/// Result of reading the device-token field.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenField {
    /// Field missing or null.
    Absent,
    /// Field is a map of tokens (possibly empty).
    Present(FcmTokens),
    /// Field holds something other than a map.
    Malformed(String),
}

impl TokenField {
    /// Classify a raw field value.
    pub fn inspect(value: Option<&FieldValue>) -> Self {
        match value {
            None => TokenField::Absent,
            Some(v) if v.is_null() => TokenField::Absent,
            Some(FieldValue::MapValue(m)) => TokenField::Present(FcmTokens(m.fields.clone())),
            Some(other) => TokenField::Malformed(format!("expected map, found {}", other.type_name())),
        }
    }
}

/// A user's registered device tokens, each mapped to an opaque value.
///
/// Only the key set is interpreted; values are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FcmTokens(BTreeMap<String, FieldValue>);

impl FcmTokens {
    /// Whether no tokens are registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Snapshot of the token strings, in sorted order.
    pub fn tokens(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Remove a token, returning its associated value.
    pub fn remove(&mut self, token: &str) -> Option<FieldValue> {
        self.0.remove(token)
    }

    /// Encode as the value stored in the user document.
    pub fn to_field_value(&self) -> FieldValue {
        FieldValue::map(self.0.clone())
    }
}
