// system-tests/tests/lifecycle_scenarios.rs
// ============================================================================
// Test: Concrete commit-gate scenarios (S1-S6)
// ============================================================================

mod support;

use std::sync::Arc;

use decision_gate_core::EnvelopeHash;
use decision_gate_core::FailureClass;
use decision_gate_core::InMemoryArtifactStore;
use decision_gate_core::TraceId;
use support::ALL_ONES_64;
use support::ALL_ZEROS_64;
use support::OTHER_TRACE_ID;
use support::TRACE_ID;
use support::auth_context_value;
use support::envelope_hash_of;
use support::gate_over;
use support::model_call_value;
use support::policy_decision_value;
use support::policy_decision_with_hash;
use support::tool_call_value;

#[test]
fn s1_auth_context_accept() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let gate = gate_over(store.clone());

    let value = auth_context_value(TRACE_ID);
    let hash = envelope_hash_of(&value);
    let outcome = gate.commit("auth_context", &hash, &value).unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.classification, FailureClass::Accept);
    assert_eq!(outcome.computed_envelope_hash, Some(hash.clone()));

    let trace_id = TraceId::parse(TRACE_ID).unwrap();
    let accepted = store.accepted_by_trace(&trace_id).unwrap();
    assert_eq!(accepted.len(), 1);
}

#[test]
fn s2_policy_decision_missing_prereq() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let gate = gate_over(store.clone());

    let value = policy_decision_with_hash(TRACE_ID, ALL_ONES_64, "allow");
    let hash = envelope_hash_of(&value);
    let outcome = gate.commit("policy_decision", &hash, &value).unwrap();

    assert!(!outcome.accepted);
    assert_eq!(outcome.classification, FailureClass::MissingPrereq);
    assert_eq!(
        outcome.error_kind.as_ref().map(|kind| kind.as_str()),
        Some("missing_prereq.auth_context"),
    );

    let rejected = store.get_rejected(&hash).unwrap();
    assert!(rejected.is_some());
}

#[test]
fn s3_unauthorized_execution() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let gate = gate_over(store.clone());

    let auth_value = auth_context_value(TRACE_ID);
    let auth_hash = envelope_hash_of(&auth_value);
    gate.commit("auth_context", &auth_hash, &auth_value).unwrap();

    let policy_value = policy_decision_value(TRACE_ID, &auth_hash, "deny");
    let policy_hash = envelope_hash_of(&policy_value);
    let policy_outcome = gate.commit("policy_decision", &policy_hash, &policy_value).unwrap();
    assert!(policy_outcome.accepted);

    let tool_value = tool_call_value(TRACE_ID, &auth_hash, &policy_hash);
    let tool_hash = envelope_hash_of(&tool_value);
    let outcome = gate.commit("tool_call", &tool_hash, &tool_value).unwrap();

    assert!(!outcome.accepted);
    assert_eq!(outcome.classification, FailureClass::UnauthorizedExecution);
    assert_eq!(
        outcome.error_kind.as_ref().map(|kind| kind.as_str()),
        Some("unauthorized.policy_denied"),
    );
    assert!(store.get_rejected(&tool_hash).unwrap().is_some());
}

#[test]
fn s4_hash_mismatch() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let gate = gate_over(store.clone());

    let auth_value = auth_context_value(TRACE_ID);
    let auth_hash = envelope_hash_of(&auth_value);
    gate.commit("auth_context", &auth_hash, &auth_value).unwrap();

    let policy_value = policy_decision_value(TRACE_ID, &auth_hash, "allow");
    let policy_hash = envelope_hash_of(&policy_value);
    gate.commit("policy_decision", &policy_hash, &policy_value).unwrap();

    let tool_value = tool_call_value(TRACE_ID, &auth_hash, &policy_hash);
    let declared_hash = EnvelopeHash::parse(ALL_ZEROS_64).unwrap();
    let outcome = gate.commit("tool_call", &declared_hash, &tool_value).unwrap();

    assert!(!outcome.accepted);
    assert_eq!(outcome.classification, FailureClass::HashMismatch);
    assert_eq!(
        outcome.error_kind.as_ref().map(|kind| kind.as_str()),
        Some("hash_mismatch.envelope_hash"),
    );

    let computed = outcome.computed_envelope_hash.expect("hash computed before mismatch check");
    assert_ne!(computed, declared_hash);
    assert!(store.get_rejected(&computed).unwrap().is_some());
}

#[test]
fn s5_trace_violation() {
    let store = Arc::new(InMemoryArtifactStore::new());
    let gate = gate_over(store.clone());

    let auth_value = auth_context_value(TRACE_ID);
    let auth_hash = envelope_hash_of(&auth_value);
    gate.commit("auth_context", &auth_hash, &auth_value).unwrap();

    let policy_value = policy_decision_value(TRACE_ID, &auth_hash, "allow");
    let policy_hash = envelope_hash_of(&policy_value);
    gate.commit("policy_decision", &policy_hash, &policy_value).unwrap();

    let model_value = model_call_value(OTHER_TRACE_ID, &auth_hash, &policy_hash, support::DIGEST_64);
    let model_hash = envelope_hash_of(&model_value);
    let outcome = gate.commit("model_call", &model_hash, &model_value).unwrap();

    assert!(!outcome.accepted);
    assert_eq!(outcome.classification, FailureClass::TraceViolation);
    assert_eq!(
        outcome.error_kind.as_ref().map(|kind| kind.as_str()),
        Some("trace_violation.trace_id_mismatch"),
    );
    assert!(store.get_rejected(&model_hash).unwrap().is_some());
}
