// decision-gate-core/src/core/hashing.rs
// ============================================================================
// Module: Decision Gate Canonical Codec
// Description: RFC 8785 (JCS) canonicalization, integer-only numeric safety,
//              duplicate-key detection, and SHA-256 content hashing.
// Purpose: Give every record a unique canonical byte sequence and a stable,
//          content-addressed identity. Pure; no I/O.
// Dependencies: serde, serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! The codec is the single source of truth for "what bytes does this record
//! canonicalize to". Two rules beyond straight JCS are enforced here because
//! they are not expressible as a JSON Schema constraint: numbers must be
//! integers that round-trip losslessly through both a signed 64-bit integer
//! and an IEEE-754 double, and a submitted object may not declare the same
//! key twice. Violating either rule means canonical bytes cannot be defined
//! for the value, which the commit gate treats as a schema rejection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde::de::Deserializer;
use serde::de::Error as DeError;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::identifiers::HexDigest;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while canonicalizing or hashing a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// JSON serialization or JCS canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
    /// A number was non-finite, non-integer, or fell outside the safe range
    /// (must fit a signed 64-bit integer AND round-trip through an IEEE-754
    /// double without loss).
    #[error("number at {path} is not a safe integer: {value}")]
    UnsafeNumber {
        /// JSON-pointer-like path to the offending number.
        path: String,
        /// The rejected number, rendered for diagnostics.
        value: String,
    },
    /// An object declared the same key more than once.
    #[error("duplicate key {key:?} at {path}")]
    DuplicateKey {
        /// JSON-pointer-like path to the offending object.
        path: String,
        /// The duplicated key.
        key: String,
    },
}

/// Largest magnitude integer that round-trips through an IEEE-754 double
/// without loss (2^53).
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_992;

// ============================================================================
// SECTION: Strict Decoding (duplicate-key detection)
// ============================================================================

/// Parses JSON bytes into a [`Value`], rejecting objects with duplicate keys.
///
/// `serde_json`'s default `Value` deserialization silently keeps the last of
/// two duplicate keys; the specification requires that duplicate keys make a
/// record's canonical bytes undefined; this function is the only place that
/// distinction can be observed, because once parsed into a `Value` the
/// duplicate has already been discarded.
///
/// # Errors
///
/// Returns [`CodecError::DuplicateKey`] if any object in `bytes` repeats a
/// key, or [`CodecError::Canonicalization`] if `bytes` is not valid JSON.
pub fn decode_record_value(bytes: &[u8]) -> Result<Value, CodecError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let strict: StrictValue = serde::Deserialize::deserialize(&mut de)
        .map_err(|err| CodecError::Canonicalization(err.to_string()))?;
    de.end()
        .map_err(|err| CodecError::Canonicalization(err.to_string()))?;
    Ok(strict.0)
}

/// Thin wrapper whose [`Deserialize`] impl walks maps and sequences by hand
/// so duplicate object keys can be rejected instead of silently overwritten.
struct StrictValue(Value);

impl<'de> Deserialize<'de> for StrictValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StrictVisitor;

        impl<'de> Visitor<'de> for StrictVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a JSON value with no duplicate object keys")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(v.into()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(v.into()))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                Number::from_f64(v).map(Value::Number).ok_or_else(|| {
                    E::custom("non-finite number")
                })
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(Value::String(v))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer).map(|StrictValue(v)| v)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut out = Vec::new();
                while let Some(StrictValue(item)) = seq.next_element()? {
                    out.push(item);
                }
                Ok(Value::Array(out))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = Map::new();
                while let Some((key, StrictValue(value))) =
                    map.next_entry::<String, StrictValue>()?
                {
                    if out.contains_key(&key) {
                        return Err(A::Error::custom(format!("duplicate key {key:?}")));
                    }
                    out.insert(key, value);
                }
                Ok(Value::Object(out))
            }
        }

        deserializer.deserialize_any(StrictVisitor).map(StrictValue)
    }
}

// ============================================================================
// SECTION: Numeric Safety
// ============================================================================

/// Walks a JSON value tree and rejects any number that is not a safe
/// integer: non-finite, non-integer, or magnitude greater than `2^53`.
fn validate_numeric_safety(value: &Value, path: &str) -> Result<(), CodecError> {
    match value {
        Value::Number(number) => validate_number(number, path),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                validate_numeric_safety(item, &format!("{path}/{index}"))?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, item) in map {
                validate_numeric_safety(item, &format!("{path}/{key}"))?;
            }
            Ok(())
        }
        Value::Bool(_) | Value::Null | Value::String(_) => Ok(()),
    }
}

fn validate_number(number: &Number, path: &str) -> Result<(), CodecError> {
    if let Some(i) = number.as_i64() {
        if i.unsigned_abs() as i128 <= MAX_SAFE_INTEGER as i128 {
            return Ok(());
        }
        return Err(unsafe_number(path, number));
    }
    if let Some(u) = number.as_u64() {
        if u <= MAX_SAFE_INTEGER as u64 {
            return Ok(());
        }
        return Err(unsafe_number(path, number));
    }
    if let Some(f) = number.as_f64() {
        if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64 {
            return Ok(());
        }
    }
    Err(unsafe_number(path, number))
}

fn unsafe_number(path: &str, number: &Number) -> CodecError {
    CodecError::UnsafeNumber {
        path: path.to_string(),
        value: number.to_string(),
    }
}

// ============================================================================
// SECTION: Canonicalization
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`CodecError`] when serialization fails, a number is not a safe
/// integer, or (for values already parsed through [`decode_record_value`]
/// into a `Value` carrying duplicates some other way) a duplicate key is
/// detected.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let as_value =
        serde_json::to_value(value).map_err(|err| CodecError::Canonicalization(err.to_string()))?;
    validate_numeric_safety(&as_value, "")?;
    serde_jcs::to_vec(&as_value).map_err(|err| CodecError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON bytes for a serializable value with SHA-256.
///
/// # Errors
///
/// Returns [`CodecError`] under the same conditions as
/// [`canonical_json_bytes`].
pub fn hash_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<HexDigest, CodecError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(&bytes))
}

/// Hashes raw bytes with SHA-256, returning a lowercase hex digest.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> HexDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    HexDigest::from_hex_unchecked(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_bytes_sort_object_keys() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(canonical_json_bytes(&a).unwrap(), canonical_json_bytes(&b).unwrap());
    }

    #[test]
    fn canonical_bytes_are_whitespace_free() {
        let bytes = canonical_json_bytes(&json!({"a": 1, "b": [1, 2]})).unwrap();
        assert_eq!(bytes, br#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn hash_is_sha256_of_canonical_bytes() {
        let value = json!({"x": 1});
        let bytes = canonical_json_bytes(&value).unwrap();
        let expected = hash_bytes(&bytes);
        assert_eq!(hash_canonical_json(&value).unwrap(), expected);
    }

    #[test]
    fn rejects_non_integer_number() {
        let err = canonical_json_bytes(&json!({"x": 1.5})).unwrap_err();
        assert!(matches!(err, CodecError::UnsafeNumber { .. }));
    }

    #[test]
    fn rejects_out_of_range_integer() {
        let value = json!({"x": 9_007_199_254_740_993_i64});
        let err = canonical_json_bytes(&value).unwrap_err();
        assert!(matches!(err, CodecError::UnsafeNumber { .. }));
    }

    #[test]
    fn accepts_integer_at_safe_boundary() {
        let value = json!({"x": 9_007_199_254_740_992_i64});
        assert!(canonical_json_bytes(&value).is_ok());
    }

    #[test]
    fn negative_zero_float_serializes_as_zero() {
        let value = json!({"x": -0.0});
        let bytes = canonical_json_bytes(&value).unwrap();
        assert_eq!(bytes, br#"{"x":0}"#);
    }

    #[test]
    fn decode_rejects_duplicate_object_keys() {
        let raw = br#"{"a":1,"a":2}"#;
        let err = decode_record_value(raw).unwrap_err();
        assert!(matches!(err, CodecError::Canonicalization(_)));
    }

    #[test]
    fn decode_accepts_well_formed_document() {
        let raw = br#"{"a":1,"b":{"c":2}}"#;
        let value = decode_record_value(raw).unwrap();
        assert_eq!(value, json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn canonicalization_is_order_independent_of_construction() {
        let mut map_a = Map::new();
        map_a.insert("z".to_string(), json!(1));
        map_a.insert("a".to_string(), json!(2));
        let mut map_b = Map::new();
        map_b.insert("a".to_string(), json!(2));
        map_b.insert("z".to_string(), json!(1));
        assert_eq!(
            canonical_json_bytes(&Value::Object(map_a)).unwrap(),
            canonical_json_bytes(&Value::Object(map_b)).unwrap()
        );
    }
}
