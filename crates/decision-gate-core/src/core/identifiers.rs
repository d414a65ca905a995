// decision-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Decision Gate Identifiers
// Description: Validated, opaque identifiers shared across record kinds.
// Purpose: Give trace ids, span ids, hashes, and tokens strong types instead
//          of passing bare `String` through the gate and replay engines.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers in this module are newtypes over `String` with a `parse`
//! constructor enforcing the pattern contracts from the wire format (§6 of
//! the specification). Schema validation is the primary enforcement point;
//! these constructors give the same guarantees to in-process code that never
//! goes through a JSON schema (tests, the trace index, replay comparisons).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error as _;

// ============================================================================
// SECTION: Format Errors
// ============================================================================

/// Error returned when a string does not satisfy an identifier's format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct FormatError {
    /// Identifier kind that rejected the value (`trace_id`, `span_id`, ...).
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

fn is_lowercase_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn is_all_zero(s: &str) -> bool {
    s.bytes().all(|b| b == b'0')
}

// ============================================================================
// SECTION: Trace Identifiers
// ============================================================================

/// 32 lowercase hex character trace identifier, never all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl<'de> Deserialize<'de> for TraceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(value).map_err(D::Error::custom)
    }
}

impl TraceId {
    /// Parses and validates a trace identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the value is not 32 lowercase hex
    /// characters, or is all zeros.
    pub fn parse(value: impl Into<String>) -> Result<Self, FormatError> {
        let value = value.into();
        if value.len() == 32 && is_lowercase_hex(&value) && !is_all_zero(&value) {
            Ok(Self(value))
        } else {
            Err(FormatError {
                kind: "trace_id",
                value,
            })
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 16 lowercase hex character span identifier, never all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SpanId(String);

impl<'de> Deserialize<'de> for SpanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(value).map_err(D::Error::custom)
    }
}

impl SpanId {
    /// Parses and validates a span identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the value is not 16 lowercase hex
    /// characters, or is all zeros.
    pub fn parse(value: impl Into<String>) -> Result<Self, FormatError> {
        let value = value.into();
        if value.len() == 16 && is_lowercase_hex(&value) && !is_all_zero(&value) {
            Ok(Self(value))
        } else {
            Err(FormatError {
                kind: "span_id",
                value,
            })
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Hash Identifiers
// ============================================================================

/// 64 lowercase hex character digest: the shape shared by envelope hashes,
/// policy hashes, and presented-credential hashes alike.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexDigest(String);

impl HexDigest {
    /// Parses and validates a 64 lowercase hex character digest.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the value is not 64 lowercase hex
    /// characters.
    pub fn parse(value: impl Into<String>) -> Result<Self, FormatError> {
        let value = value.into();
        if value.len() == 64 && is_lowercase_hex(&value) {
            Ok(Self(value))
        } else {
            Err(FormatError {
                kind: "hex_digest",
                value,
            })
        }
    }

    /// Returns the digest as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds a digest from a value already known to be 64 lowercase hex
    /// characters (the output of the SHA-256 hex encoder). Bypasses
    /// [`HexDigest::parse`] so the hashing module never has to handle a
    /// `Result` for a value it just produced itself.
    #[must_use]
    pub(crate) fn from_hex_unchecked(value: String) -> Self {
        debug_assert!(value.len() == 64 && is_lowercase_hex(&value));
        Self(value)
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An envelope hash: the content-addressed identity of an accepted or
/// rejected-attempt artifact. Shares the 64 lowercase hex shape of
/// [`HexDigest`] but is kept as a distinct type so a policy hash can never be
/// passed where an envelope hash is expected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeHash(String);

impl EnvelopeHash {
    /// Parses and validates an envelope hash.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the value is not 64 lowercase hex
    /// characters.
    pub fn parse(value: impl Into<String>) -> Result<Self, FormatError> {
        let value = value.into();
        if value.len() == 64 && is_lowercase_hex(&value) {
            Ok(Self(value))
        } else {
            Err(FormatError {
                kind: "envelope_hash",
                value,
            })
        }
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvelopeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<HexDigest> for EnvelopeHash {
    fn from(value: HexDigest) -> Self {
        Self(value.0)
    }
}

// ============================================================================
// SECTION: Token and Resource
// ============================================================================

/// Short identifier token: `^[a-z0-9][a-z0-9_\-:.]{0,127}$`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Parses and validates a token.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the value does not match the token
    /// pattern.
    pub fn parse(value: impl Into<String>) -> Result<Self, FormatError> {
        let value = value.into();
        if is_valid_token(&value) {
            Ok(Self(value))
        } else {
            Err(FormatError {
                kind: "token",
                value,
            })
        }
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn is_valid_token(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.is_empty() || bytes.len() > 128 {
        return false;
    }
    let first_ok = bytes[0].is_ascii_lowercase() || bytes[0].is_ascii_digit();
    first_ok
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'-' | b':' | b'.'))
}

/// Resource path identifier: `^[a-z0-9][a-z0-9_\-:./]{0,255}$`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Parses and validates a resource identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the value does not match the resource
    /// pattern.
    pub fn parse(value: impl Into<String>) -> Result<Self, FormatError> {
        let value = value.into();
        if is_valid_resource(&value) {
            Ok(Self(value))
        } else {
            Err(FormatError {
                kind: "resource",
                value,
            })
        }
    }

    /// Returns the resource as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn is_valid_resource(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.is_empty() || bytes.len() > 256 {
        return false;
    }
    let first_ok = bytes[0].is_ascii_lowercase() || bytes[0].is_ascii_digit();
    first_ok
        && bytes.iter().all(|b| {
            b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'-' | b':' | b'.' | b'/')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_rejects_all_zero() {
        assert!(TraceId::parse("0".repeat(32)).is_err());
    }

    #[test]
    fn trace_id_accepts_valid_value() {
        assert!(TraceId::parse("4bf92f3577b34da6a3ce929d0e0e4736").is_ok());
    }

    #[test]
    fn trace_id_deserialize_rejects_all_zero() {
        let json = format!("\"{}\"", "0".repeat(32));
        assert!(serde_json::from_str::<TraceId>(&json).is_err());
    }

    #[test]
    fn span_id_deserialize_rejects_all_zero() {
        let json = format!("\"{}\"", "0".repeat(16));
        assert!(serde_json::from_str::<SpanId>(&json).is_err());
    }

    #[test]
    fn span_id_rejects_wrong_length() {
        assert!(SpanId::parse("00f067aa0ba902b").is_err());
    }

    #[test]
    fn hex_digest_rejects_uppercase() {
        assert!(HexDigest::parse("A".repeat(64)).is_err());
    }

    #[test]
    fn token_rejects_leading_uppercase() {
        assert!(Token::parse("Abc").is_err());
    }

    #[test]
    fn token_rejects_empty() {
        assert!(Token::parse("").is_err());
    }

    #[test]
    fn resource_accepts_path_like_value() {
        assert!(Resource::parse("tenants/acme/documents/42").is_ok());
    }
}
