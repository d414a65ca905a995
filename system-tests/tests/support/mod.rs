// system-tests/tests/support/mod.rs
// ============================================================================
// Module: System Test Fixtures
// Description: Shared record builders and gate/store wiring for the
//              cross-crate integration tests.
// Purpose: Give every scenario test the same well-formed baseline chain so
//          each test only needs to vary the one field its scenario is about.
// Dependencies: decision-gate-contract, decision-gate-core
// ============================================================================

#![allow(dead_code, reason = "not every test file exercises every helper")]

use std::sync::Arc;

use decision_gate_contract::JsonSchemaValidator;
use decision_gate_core::ArtifactStore;
use decision_gate_core::CommitGate;
use decision_gate_core::EnvelopeHash;
use decision_gate_core::canonical_json_bytes;
use decision_gate_core::hash_bytes;
use serde_json::Value;
use serde_json::json;

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const OTHER_TRACE_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const DIGEST_64: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const ALL_ONES_64: &str = "1111111111111111111111111111111111111111111111111111111111111111";
pub const ALL_ZEROS_64: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub fn gate_over(store: Arc<dyn ArtifactStore + Send + Sync>) -> CommitGate {
    let validator = Arc::new(JsonSchemaValidator::new().expect("schemas compile"));
    CommitGate::new(store, validator)
}

pub fn envelope_hash_of(value: &Value) -> EnvelopeHash {
    let canonical_bytes = canonical_json_bytes(value).expect("fixtures are canonicalizable");
    hash_bytes(&canonical_bytes).into()
}

pub fn auth_context_value(trace_id: &str) -> Value {
    json!({
        "record_type": "auth_context",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": trace_id, "span_id": "00f067aa0ba902b7", "span_kind": "root" },
        "producer": { "layer": "gateway", "component": "ingress" },
        "ts_ms": 1_769_817_600_000_u64,
        "actor": { "actor_kind": "human", "actor_id": "u1" },
        "credential": {
            "credential_kind": "oauth_token",
            "issuer": "idp",
            "presented_hash_sha256": DIGEST_64,
            "verified_at_ms": 1,
            "expires_at_ms": 2,
        },
        "grants": { "read": true },
    })
}

pub fn policy_decision_value(trace_id: &str, auth_hash: &EnvelopeHash, result: &str) -> Value {
    json!({
        "record_type": "policy_decision",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": trace_id, "span_id": "10f067aa0ba902b7", "span_kind": "child", "parent_span_id": "00f067aa0ba902b7" },
        "producer": { "layer": "policy", "component": "decider" },
        "ts_ms": 1_769_817_600_100_u64,
        "auth_context_envelope_sha256": auth_hash.as_str(),
        "policy": { "policy_id": "p1", "policy_version": "v1", "policy_sha256": DIGEST_64 },
        "request": { "action": "invoke", "resource": "model:example" },
        "decision": { "result": result, "reason_codes": { "within_quota": true }, "obligations": {} },
    })
}

pub fn policy_decision_with_hash(trace_id: &str, auth_hash_str: &str, result: &str) -> Value {
    json!({
        "record_type": "policy_decision",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": trace_id, "span_id": "10f067aa0ba902b7", "span_kind": "child", "parent_span_id": "00f067aa0ba902b7" },
        "producer": { "layer": "policy", "component": "decider" },
        "ts_ms": 1_769_817_600_100_u64,
        "auth_context_envelope_sha256": auth_hash_str,
        "policy": { "policy_id": "p1", "policy_version": "v1", "policy_sha256": DIGEST_64 },
        "request": { "action": "invoke", "resource": "model:example" },
        "decision": { "result": result, "reason_codes": { "within_quota": true }, "obligations": {} },
    })
}

pub fn tool_call_value(trace_id: &str, auth_hash: &EnvelopeHash, policy_hash: &EnvelopeHash) -> Value {
    json!({
        "record_type": "tool_call",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": trace_id, "span_id": "20f067aa0ba902b7", "span_kind": "child", "parent_span_id": "10f067aa0ba902b7" },
        "producer": { "layer": "execution", "component": "tool-runner" },
        "started_at_ms": 1_769_817_600_200_u64,
        "ended_at_ms": 1_769_817_600_300_u64,
        "auth_context_envelope_sha256": auth_hash.as_str(),
        "policy_decision_envelope_sha256": policy_hash.as_str(),
        "request": { "content_type": "application/json", "sha256": DIGEST_64, "size_bytes": 64 },
        "response": { "content_type": "application/json", "sha256": DIGEST_64, "size_bytes": 64 },
        "outcome": { "status": "ok" },
        "tool": { "tool_id": "example-tool", "tool_version": "1" },
    })
}

pub fn model_call_value(trace_id: &str, auth_hash: &EnvelopeHash, policy_hash: &EnvelopeHash, response_sha256: &str) -> Value {
    json!({
        "record_type": "model_call",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": trace_id, "span_id": "20f067aa0ba902b7", "span_kind": "child", "parent_span_id": "10f067aa0ba902b7" },
        "producer": { "layer": "execution", "component": "model-runner" },
        "started_at_ms": 1_769_817_600_200_u64,
        "ended_at_ms": 1_769_817_600_300_u64,
        "auth_context_envelope_sha256": auth_hash.as_str(),
        "policy_decision_envelope_sha256": policy_hash.as_str(),
        "request": { "content_type": "application/json", "sha256": DIGEST_64, "size_bytes": 128 },
        "response": { "content_type": "application/json", "sha256": response_sha256, "size_bytes": 256 },
        "outcome": { "status": "ok" },
        "model": { "model_id": "example-model", "model_version": "2026-01" },
        "allow_response_blobref": true,
    })
}
