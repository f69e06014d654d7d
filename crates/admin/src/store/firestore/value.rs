//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore wraps every value in a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). Documents are
//! handled as plain JSON everywhere else, so this module is the only place
//! that knows the wire shape.
//!
//! The date-time fields in [`TIMESTAMP_FIELDS`] are written as
//! `timestampValue` so ordering and console display work on the server.
//! Every other string stays a `stringValue`, whatever it looks like.
//! Timestamps read back come out as strings again.

use chrono::DateTime;
use serde_json::{Map, Number, Value, json};

use crate::store::{Fields, StoreError};

/// Document fields holding RFC 3339 date-times.
pub const TIMESTAMP_FIELDS: [&str; 3] = ["archivedAt", "createdAt", "lastLogin"];

/// Encode a plain field map as Firestore `fields`.
#[must_use]
pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_field(name, value)))
        .collect()
}

fn encode_field(name: &str, value: &Value) -> Value {
    match value {
        Value::String(s) if TIMESTAMP_FIELDS.contains(&name) && is_timestamp(s) => {
            json!({ "timestampValue": s })
        }
        _ => encode_value(value),
    }
}

/// Encode one plain JSON value. Strings are always `stringValue`.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                json!({ "integerValue": n.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode Firestore `fields` into a plain field map.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if any value has an unknown shape.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Fields, StoreError> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

/// Decode one Firestore typed value.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if the value is not a single-key typed
/// object or the payload does not match its type.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Err(StoreError::Decode(format!("untyped value: {value}")));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| mismatch(kind, inner)),
        "integerValue" => decode_integer(inner).ok_or_else(|| mismatch(kind, inner)),
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and infinities arrive as strings and have no JSON form
            Value::String(_) => Ok(Value::Null),
            _ => Err(mismatch(kind, inner)),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_owned()))
            .ok_or_else(|| mismatch(kind, inner)),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(StoreError::Decode(format!("unsupported value type: {other}"))),
    }
}

/// Integers travel as decimal strings (int64 does not fit a JSON double).
fn decode_integer(inner: &Value) -> Option<Value> {
    match inner {
        Value::String(s) => s.parse::<i64>().ok().map(|n| Value::Number(Number::from(n))),
        Value::Number(n) => Some(Value::Number(n.clone())),
        _ => None,
    }
}

fn is_timestamp(s: &str) -> bool {
    s.contains('T') && DateTime::parse_from_rfc3339(s).is_ok()
}

fn mismatch(kind: &str, inner: &Value) -> StoreError {
    StoreError::Decode(format!("{kind} has unexpected payload {inner}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!(null)), json!({"nullValue": null}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
        assert_eq!(encode_value(&json!("Juan")), json!({"stringValue": "Juan"}));
    }

    #[test]
    fn test_encode_timestamp_fields() {
        let fields = json!({
            "archivedAt": "2024-03-01T08:30:00Z",
            "lastLogin": "2024-03-01T09:00:00+08:00",
            "createdAt": "2024-03-01"
        });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(
            encoded["archivedAt"],
            json!({"timestampValue": "2024-03-01T08:30:00Z"})
        );
        assert_eq!(
            encoded["lastLogin"],
            json!({"timestampValue": "2024-03-01T09:00:00+08:00"})
        );
        // Date-only strings stay strings
        assert_eq!(encoded["createdAt"], json!({"stringValue": "2024-03-01"}));
    }

    #[test]
    fn test_date_like_text_stays_string() {
        let text = "2024-03-01T09:00:00+08:00";
        let fields = json!({ "name": text, "address": text });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(encoded["name"], json!({"stringValue": text}));
        assert_eq!(encoded["address"], json!({"stringValue": text}));

        // Query values are encoded without a field name
        assert_eq!(encode_value(&json!(text)), json!({"stringValue": text}));
    }

    #[test]
    fn test_encode_nested() {
        let encoded = encode_value(&json!({"vehicleTypes": ["Truck", "Van"]}));
        assert_eq!(
            encoded,
            json!({
                "mapValue": {"fields": {
                    "vehicleTypes": {"arrayValue": {"values": [
                        {"stringValue": "Truck"},
                        {"stringValue": "Van"}
                    ]}}
                }}
            })
        );
    }

    #[test]
    fn test_decode_document_fields() {
        let raw = json!({
            "name": {"stringValue": "Juan Dela Cruz"},
            "isArchived": {"booleanValue": false},
            "visits": {"integerValue": "7"},
            "archivedAt": {"nullValue": null},
            "lastLogin": {"timestampValue": "2024-03-01T08:30:00.123456Z"},
            "vehicleTypes": {"arrayValue": {"values": [{"stringValue": "Truck"}]}},
            "empty": {"arrayValue": {}},
            "meta": {"mapValue": {}}
        });

        let fields = decode_fields(raw.as_object().unwrap()).unwrap();
        assert_eq!(fields["name"], json!("Juan Dela Cruz"));
        assert_eq!(fields["isArchived"], json!(false));
        assert_eq!(fields["visits"], json!(7));
        assert!(fields["archivedAt"].is_null());
        assert_eq!(fields["lastLogin"], json!("2024-03-01T08:30:00.123456Z"));
        assert_eq!(fields["vehicleTypes"], json!(["Truck"]));
        assert_eq!(fields["empty"], json!([]));
        assert_eq!(fields["meta"], json!({}));
    }

    #[test]
    fn test_decode_rejects_unknown_shapes() {
        assert!(decode_value(&json!("bare")).is_err());
        assert!(decode_value(&json!({"integerValue": "x"})).is_err());
        assert!(decode_value(&json!({"weirdValue": 1})).is_err());
    }

    #[test]
    fn test_round_trip_preserves_customer_fields() {
        let original = json!({
            "customerId": "CUS-001",
            "isArchived": true,
            "archivedAt": "2024-05-01T00:00:00Z",
            "vehicleTypes": ["Truck"]
        });
        let encoded = encode_fields(original.as_object().unwrap());
        let decoded = decode_fields(&encoded).unwrap();
        assert_eq!(Value::Object(decoded), original);
    }
}
