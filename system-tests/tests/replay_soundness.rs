// system-tests/tests/replay_soundness.rs
// ============================================================================
// Test: Universal properties 6-9 (invariant soundness, forensic refinement,
// trace-index stability, constrained replay closure) and scenario S6.
// ============================================================================

mod support;

use std::sync::Arc;

use decision_gate_contract::JsonSchemaValidator;
use decision_gate_core::ConstrainedReplayEngine;
use decision_gate_core::ForensicReplayEngine;
use decision_gate_core::InMemoryArtifactStore;
use decision_gate_core::InvariantReplayEngine;
use decision_gate_core::ReplayVerdict;
use decision_gate_core::SystemClock;
use decision_gate_core::TraceId;
use decision_gate_core::VariancePolicy;
use support::OTHER_TRACE_ID;
use support::TRACE_ID;
use support::auth_context_value;
use support::envelope_hash_of;
use support::gate_over;
use support::model_call_value;
use support::policy_decision_value;

fn build_full_chain(trace_id: &str, store: Arc<InMemoryArtifactStore>, response_sha256: &str) {
    let gate = gate_over(store);

    let auth_value = auth_context_value(trace_id);
    let auth_hash = envelope_hash_of(&auth_value);
    gate.commit("auth_context", &auth_hash, &auth_value).unwrap();

    let policy_value = policy_decision_value(trace_id, &auth_hash, "allow");
    let policy_hash = envelope_hash_of(&policy_value);
    gate.commit("policy_decision", &policy_hash, &policy_value).unwrap();

    let model_value = model_call_value(trace_id, &auth_hash, &policy_hash, response_sha256);
    let model_hash = envelope_hash_of(&model_value);
    let outcome = gate.commit("model_call", &model_hash, &model_value).unwrap();
    assert!(outcome.accepted, "baseline chain must be fully accepted: {outcome:?}");
}

#[test]
fn invariant_replay_soundness() {
    let store = Arc::new(InMemoryArtifactStore::new());
    build_full_chain(TRACE_ID, store.clone(), support::DIGEST_64);

    let validator = Arc::new(JsonSchemaValidator::new().unwrap());
    let clock = Arc::new(SystemClock);
    let engine = InvariantReplayEngine::new(store, validator, clock);

    let trace_id = TraceId::parse(TRACE_ID).unwrap();
    let outcome = engine.replay(&trace_id).unwrap();
    assert_eq!(outcome.record.result, ReplayVerdict::Pass);
}

#[test]
fn forensic_replay_implies_invariant_replay() {
    let store = Arc::new(InMemoryArtifactStore::new());
    build_full_chain(TRACE_ID, store.clone(), support::DIGEST_64);

    let validator_a = Arc::new(JsonSchemaValidator::new().unwrap());
    let validator_b = Arc::new(JsonSchemaValidator::new().unwrap());
    let clock = Arc::new(SystemClock);

    let forensic = ForensicReplayEngine::new(store.clone(), validator_a, clock.clone());
    let invariant = InvariantReplayEngine::new(store, validator_b, clock);

    let trace_id = TraceId::parse(TRACE_ID).unwrap();
    let forensic_outcome = forensic.replay(&trace_id).unwrap();
    assert_eq!(forensic_outcome.record.result, ReplayVerdict::Pass);

    let invariant_outcome = invariant.replay(&trace_id).unwrap();
    assert_eq!(invariant_outcome.record.result, ReplayVerdict::Pass);
}

#[test]
fn trace_index_resolution_is_stable_across_calls() {
    let store = Arc::new(InMemoryArtifactStore::new());
    build_full_chain(TRACE_ID, store.clone(), support::DIGEST_64);

    let trace_id = TraceId::parse(TRACE_ID).unwrap();
    let index = decision_gate_core::TraceIndex::new(store);
    let first = index.resolve(&trace_id, false).unwrap();
    let second = index.resolve(&trace_id, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn s6_constrained_replay_allows_declared_response_variance() {
    let baseline_store = Arc::new(InMemoryArtifactStore::new());
    build_full_chain(TRACE_ID, baseline_store.clone(), support::DIGEST_64);

    let candidate_store = Arc::new(InMemoryArtifactStore::new());
    let differing_response = "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";
    build_full_chain(OTHER_TRACE_ID, candidate_store.clone(), differing_response);

    // Constrained replay reads both traces through the same store, so merge
    // the candidate's accepted artifacts into the baseline store.
    let trace_id = TraceId::parse(OTHER_TRACE_ID).unwrap();
    for artifact in candidate_store.accepted_by_trace(&trace_id).unwrap() {
        baseline_store.put_accepted(artifact).unwrap();
    }

    let validator = Arc::new(JsonSchemaValidator::new().unwrap());
    let clock = Arc::new(SystemClock);
    let engine = ConstrainedReplayEngine::new(baseline_store, validator, clock);

    let baseline_id = TraceId::parse(TRACE_ID).unwrap();
    let policy = VariancePolicy {
        allow_model_call_variance: true,
        allow_tool_call_variance: false,
    };
    let outcome = engine.replay(&baseline_id, &trace_id, &policy).unwrap();
    assert_eq!(outcome.record.result, ReplayVerdict::Pass);
}
