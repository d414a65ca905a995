// decision-gate-core/src/core/string_set.rs
// ============================================================================
// Module: Decision Gate String Set
// Description: The `{ "key": true, ... }` discipline used by every
//              string-set field across record kinds.
// Purpose: Keep canonical form independent of insertion order for sets
//          represented as JSON objects, without relying on callers to
//          remember the `true`-valued-map convention by hand.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Grants, reason codes, and obligations are modeled as objects mapping each
//! member key to the literal boolean `true` rather than as JSON arrays,
//! because object canonicalization (§4.1) sorts member names, giving a
//! stable canonical byte sequence regardless of how the set was built. An
//! array would need its own order-independence rule; the object discipline
//! reuses the one the codec already has.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as DeError;

/// A set of string members serialized as `{ "key": true, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSet(BTreeSet<String>);

impl StringSet {
    /// Creates an empty string set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Creates a string set from an iterator of members.
    #[must_use]
    pub fn from_iter(members: impl IntoIterator<Item = String>) -> Self {
        Self(members.into_iter().collect())
    }

    /// Returns true if `member` is in the set.
    #[must_use]
    pub fn contains(&self, member: &str) -> bool {
        self.0.contains(member)
    }

    /// Iterates the set's members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for StringSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for member in &self.0 {
            map.serialize_entry(member, &true)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StringSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: std::collections::BTreeMap<String, bool> =
            Deserialize::deserialize(deserializer)?;
        let mut members = BTreeSet::new();
        for (key, value) in raw {
            if !value {
                return Err(DeError::custom(format!(
                    "string-set member {key:?} must map to true"
                )));
            }
            members.insert(key);
        }
        Ok(Self(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let set = StringSet::from_iter(["b".to_string(), "a".to_string()]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"a":true,"b":true}"#);
        let parsed: StringSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn rejects_false_valued_member() {
        let result: Result<StringSet, _> = serde_json::from_str(r#"{"a":false}"#);
        assert!(result.is_err());
    }
}
