// demos/minimal/src/main.rs
// ============================================================================
// Module: Decision Gate Minimal Demo
// Description: Minimal end-to-end commit-then-replay run using in-memory
//              adapters.
// Purpose: Demonstrate an auth_context -> policy_decision -> model_call
//          chain being accepted by the commit gate and then re-verified by
//          invariant replay.
// Dependencies: decision-gate-core, decision-gate-contract
// ============================================================================

//! ## Overview
//! Builds three records by hand, submits each through [`CommitGate::commit`]
//! in chain order, then runs [`InvariantReplayEngine::replay`] over the
//! resulting trace. This demo is backend-agnostic: it only ever talks to the
//! `ArtifactStore` and `SchemaValidator` trait objects.

use std::io::Write;
use std::sync::Arc;

use decision_gate_contract::JsonSchemaValidator;
use decision_gate_core::CommitGate;
use decision_gate_core::EnvelopeHash;
use decision_gate_core::InMemoryArtifactStore;
use decision_gate_core::InvariantReplayEngine;
use decision_gate_core::SystemClock;
use decision_gate_core::TraceId;
use decision_gate_core::canonical_json_bytes;
use decision_gate_core::hash_bytes;
use serde_json::Value;
use serde_json::json;

const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
const DIGEST_64: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn auth_context_value() -> Value {
    json!({
        "record_type": "auth_context",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": TRACE_ID, "span_id": "00f067aa0ba902b7", "span_kind": "root" },
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

fn policy_decision_value(auth_hash: &EnvelopeHash) -> Value {
    json!({
        "record_type": "policy_decision",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": TRACE_ID, "span_id": "10f067aa0ba902b7", "span_kind": "child", "parent_span_id": "00f067aa0ba902b7" },
        "producer": { "layer": "policy", "component": "decider" },
        "ts_ms": 1_769_817_600_100_u64,
        "auth_context_envelope_sha256": auth_hash.as_str(),
        "policy": { "policy_id": "p1", "policy_version": "v1", "policy_sha256": DIGEST_64 },
        "request": { "action": "invoke", "resource": "model:example" },
        "decision": { "result": "allow", "reason_codes": { "within_quota": true }, "obligations": {} },
    })
}

fn model_call_value(auth_hash: &EnvelopeHash, policy_hash: &EnvelopeHash) -> Value {
    json!({
        "record_type": "model_call",
        "spec_version": "1.0.0",
        "canon_version": "1",
        "trace": { "trace_id": TRACE_ID, "span_id": "20f067aa0ba902b7", "span_kind": "child", "parent_span_id": "10f067aa0ba902b7" },
        "producer": { "layer": "execution", "component": "model-runner" },
        "started_at_ms": 1_769_817_600_200_u64,
        "ended_at_ms": 1_769_817_600_300_u64,
        "auth_context_envelope_sha256": auth_hash.as_str(),
        "policy_decision_envelope_sha256": policy_hash.as_str(),
        "request": { "content_type": "application/json", "sha256": DIGEST_64, "size_bytes": 128 },
        "response": { "content_type": "application/json", "sha256": DIGEST_64, "size_bytes": 256 },
        "outcome": { "status": "ok" },
        "model": { "model_id": "example-model", "model_version": "2026-01" },
        "usage": { "input_tokens": 42, "output_tokens": 17 },
    })
}

fn commit_or_die(gate: &CommitGate, kind: &str, value: &Value) -> EnvelopeHash {
    let canonical_bytes =
        canonical_json_bytes(value).expect("demo records are always canonicalizable");
    let hash: EnvelopeHash = hash_bytes(&canonical_bytes).into();
    let outcome = gate
        .commit(kind, &hash, value)
        .expect("in-memory store never fails");
    assert!(outcome.accepted, "demo record for {kind} was rejected: {outcome:?}");
    hash
}

fn write_line(label: &str, value: &str) -> Result<(), std::io::Error> {
    let mut out = std::io::stdout();
    writeln!(out, "{label}: {value}")?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(InMemoryArtifactStore::new());
    let validator = Arc::new(JsonSchemaValidator::new()?);
    let gate = CommitGate::new(store.clone(), validator.clone());

    let auth_hash = commit_or_die(&gate, "auth_context", &auth_context_value());
    write_line("accepted auth_context", auth_hash.as_str())?;

    let policy_hash = commit_or_die(&gate, "policy_decision", &policy_decision_value(&auth_hash));
    write_line("accepted policy_decision", policy_hash.as_str())?;

    let model_call_hash = commit_or_die(&gate, "model_call", &model_call_value(&auth_hash, &policy_hash));
    write_line("accepted model_call", model_call_hash.as_str())?;

    let trace_id = TraceId::parse(TRACE_ID)?;
    let clock = Arc::new(SystemClock);
    let invariant = InvariantReplayEngine::new(store, validator, clock);
    let outcome = invariant.replay(&trace_id)?;

    write_line("replay verdict", &format!("{:?}", outcome.record.result))?;
    write_line("replay result hash", outcome.hash.as_str())?;
    Ok(())
}
