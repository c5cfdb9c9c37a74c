//! # Field Map Codec
//!
//! Stateless encode/decode between a field map and its deterministic byte
//! string. Encoding goes through [`CanonicalBytes`], so identical field
//! names and values always give identical bytes regardless of insertion
//! order. Decoding inverts encoding exactly for anything `encode_fields`
//! can produce.

use serde_json::Value;

use crate::canonical::CanonicalBytes;
use crate::error::{CanonicalizationError, HashChainError};
use crate::fields::FieldMap;

/// Encode a field map to canonical bytes.
///
/// # Errors
///
/// Fails with `CanonicalizationError::FloatRejected` if any value holds a
/// float.
pub fn encode_fields(fields: &FieldMap) -> Result<CanonicalBytes, CanonicalizationError> {
    CanonicalBytes::new(fields)
}

/// Decode bytes produced by [`encode_fields`] back into a field map.
///
/// # Errors
///
/// Returns `HashChainError::Decode` if the bytes are not JSON or the
/// top-level value is not an object.
pub fn decode_fields(bytes: &[u8]) -> Result<FieldMap, HashChainError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| HashChainError::Decode(format!("invalid document: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(HashChainError::Decode(format!(
            "expected an object at top level, got {}",
            json_kind(&other)
        ))),
    }
}

/// Take a nested object out of a decoded map.
///
/// # Errors
///
/// Returns `HashChainError::Decode` if `key` is missing or not an object.
pub fn take_object(map: &mut FieldMap, key: &str) -> Result<FieldMap, HashChainError> {
    match map.remove(key) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(other) => Err(HashChainError::Decode(format!(
            "field {key:?} must be an object, got {}",
            json_kind(&other)
        ))),
        None => Err(HashChainError::Decode(format!("missing field {key:?}"))),
    }
}

/// Human-readable JSON kind for decode diagnostics.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> FieldMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn encode_is_insertion_order_independent() {
        let mut a = FieldMap::new();
        a.insert("z".into(), json!(1));
        a.insert("a".into(), json!(2));
        let mut b = FieldMap::new();
        b.insert("a".into(), json!(2));
        b.insert("z".into(), json!(1));
        assert_eq!(
            encode_fields(&a).unwrap().as_bytes(),
            encode_fields(&b).unwrap().as_bytes()
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let fields = map(json!({
            "fieldA": "ABC",
            "fieldB": 5,
            "house": {"rooms": {"Bedroom 1": {"size": 124}}},
            "tags": ["x", "y"]
        }));
        let bytes = encode_fields(&fields).unwrap();
        let decoded = decode_fields(bytes.as_bytes()).unwrap();
        assert_eq!(decoded, fields);
        assert_eq!(encode_fields(&decoded).unwrap(), bytes);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_fields(b"\x00\x01not json").unwrap_err();
        assert!(matches!(err, HashChainError::Decode(_)));
    }

    #[test]
    fn decode_rejects_non_object() {
        let err = decode_fields(b"[1,2,3]").unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn take_object_requires_object() {
        let mut m = map(json!({"header": {"a": 1}, "body": 3}));
        assert_eq!(take_object(&mut m, "header").unwrap(), map(json!({"a": 1})));
        assert!(take_object(&mut m, "body").is_err());
        assert!(take_object(&mut m, "missing").is_err());
    }
}
