//! Typed document values.
//!
//! `FieldValue` mirrors the Firestore value union. Its serde representation
//! is exactly the Firestore REST encoding (`{"stringValue": "x"}`,
//! `{"integerValue": "42"}`, ...), so a value read from either backend is
//! written back without changing its type.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Named fields of a document or map value.
pub type Fields = BTreeMap<String, FieldValue>;

/// A single typed document value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    NullValue(()),
    BooleanValue(bool),
    #[serde(with = "int_string")]
    IntegerValue(i64),
    DoubleValue(f64),
    /// RFC 3339 timestamp.
    TimestampValue(String),
    StringValue(String),
    /// Base64-encoded bytes.
    BytesValue(String),
    /// Resource name of another document.
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

/// Geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

/// Nested map of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: Fields,
}

impl FieldValue {
    /// The null value.
    pub fn null() -> Self {
        FieldValue::NullValue(())
    }

    /// Wrap a field map as a map value.
    pub fn map(fields: Fields) -> Self {
        FieldValue::MapValue(MapValue { fields })
    }

    /// Borrow the inner fields if this is a map value.
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            FieldValue::MapValue(m) => Some(&m.fields),
            _ => None,
        }
    }

    /// Whether this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::NullValue(()))
    }

    /// Short type name, used in log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::NullValue(()) => "null",
            FieldValue::BooleanValue(_) => "boolean",
            FieldValue::IntegerValue(_) => "integer",
            FieldValue::DoubleValue(_) => "double",
            FieldValue::TimestampValue(_) => "timestamp",
            FieldValue::StringValue(_) => "string",
            FieldValue::BytesValue(_) => "bytes",
            FieldValue::ReferenceValue(_) => "reference",
            FieldValue::GeoPointValue(_) => "geo point",
            FieldValue::ArrayValue(_) => "array",
            FieldValue::MapValue(_) => "map",
        }
    }

    /// Convert plain JSON into a typed value.
    ///
    /// Integral numbers become integers, other numbers become doubles, and
    /// objects become maps. Strings are never reinterpreted as timestamps.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => FieldValue::null(),
            Value::Bool(b) => FieldValue::BooleanValue(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::IntegerValue(i),
                None => FieldValue::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FieldValue::StringValue(s.clone()),
            Value::Array(items) => FieldValue::ArrayValue(ArrayValue {
                values: items.iter().map(FieldValue::from_json).collect(),
            }),
            Value::Object(obj) => FieldValue::map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert into plain JSON for display.
    ///
    /// Lossy: timestamps, bytes, and references become strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            FieldValue::NullValue(()) => Value::Null,
            FieldValue::BooleanValue(b) => Value::Bool(*b),
            FieldValue::IntegerValue(i) => Value::from(*i),
            FieldValue::DoubleValue(d) => Value::from(*d),
            FieldValue::TimestampValue(s)
            | FieldValue::StringValue(s)
            | FieldValue::BytesValue(s)
            | FieldValue::ReferenceValue(s) => Value::String(s.clone()),
            FieldValue::GeoPointValue(p) => serde_json::json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
            }),
            FieldValue::ArrayValue(a) => {
                Value::Array(a.values.iter().map(FieldValue::to_json).collect())
            }
            FieldValue::MapValue(m) => Value::Object(
                m.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Convert a plain JSON object into document fields.
///
/// Returns `None` when the value is not an object.
pub fn fields_from_json(value: &serde_json::Value) -> Option<Fields> {
    value.as_object().map(|obj| {
        obj.iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
            .collect()
    })
}

/// Convert document fields into a plain JSON object.
pub fn fields_to_json(fields: &Fields) -> serde_json::Value {
    serde_json::Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

/// Integers travel as decimal strings; numbers are accepted on input too.
mod int_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(i64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(de::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}
