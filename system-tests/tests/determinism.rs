// system-tests/tests/determinism.rs
// ============================================================================
// Test: Universal properties 1-5 (canonicalization, identity, gate
// determinism, rejection persistence).
// ============================================================================

mod support;

use std::sync::Arc;

use decision_gate_core::FailureClass;
use decision_gate_core::InMemoryArtifactStore;
use decision_gate_core::canonical_json_bytes;
use decision_gate_core::hash_bytes;
use serde_json::json;
use support::TRACE_ID;
use support::auth_context_value;
use support::envelope_hash_of;
use support::gate_over;

#[test]
fn canonicalization_is_a_pure_function() {
    let value = auth_context_value(TRACE_ID);
    let first = canonical_json_bytes(&value).unwrap();
    let second = canonical_json_bytes(&value).unwrap();
    assert_eq!(first, second);
}

#[test]
fn canonicalization_is_independent_of_key_order() {
    let a = json!({ "a": 1, "b": 2, "c": { "x": true, "y": false } });
    let b = json!({ "c": { "y": false, "x": true }, "b": 2, "a": 1 });
    assert_eq!(canonical_json_bytes(&a).unwrap(), canonical_json_bytes(&b).unwrap());
}

#[test]
fn identity_hash_equals_sha256_of_canonical_bytes() {
    let value = auth_context_value(TRACE_ID);
    let canonical_bytes = canonical_json_bytes(&value).unwrap();
    let expected = hash_bytes(&canonical_bytes);
    let via_helper = envelope_hash_of(&value);
    assert_eq!(expected.as_str(), via_helper.as_str());
}

#[test]
fn gate_is_deterministic_across_repeated_runs() {
    let value = auth_context_value(TRACE_ID);
    let hash = envelope_hash_of(&value);

    for _ in 0..3 {
        let store = Arc::new(InMemoryArtifactStore::new());
        let gate = gate_over(store);
        let outcome = gate.commit("auth_context", &hash, &value).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.classification, FailureClass::Accept);
        assert_eq!(outcome.computed_envelope_hash, Some(hash.clone()));
    }
}

#[test]
fn schema_reject_leaves_the_store_untouched() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let gate = gate_over(store.clone());

    let mut value = auth_context_value(TRACE_ID);
    value.as_object_mut().unwrap().remove("ts_ms");
    let hash = envelope_hash_of(&auth_context_value(TRACE_ID));

    let outcome = gate.commit("auth_context", &hash, &value).unwrap();
    assert!(!outcome.accepted);
    assert_eq!(outcome.classification, FailureClass::SchemaReject);

    let trace_id = decision_gate_core::TraceId::parse(TRACE_ID).unwrap();
    assert!(store.accepted_by_trace(&trace_id).unwrap().is_empty());
    assert!(store.rejected_by_trace(&trace_id).unwrap().is_empty());
}
