// system-tests/tests/sqlite_persistence.rs
// ============================================================================
// Test: Commit gate and replay engines over the SQLite-backed artifact
// store, including a process-restart simulation via reopening the same
// database file.
// ============================================================================

mod support;

use std::sync::Arc;

use decision_gate_contract::JsonSchemaValidator;
use decision_gate_core::ArtifactStore;
use decision_gate_core::CommitGate;
use decision_gate_core::FailureClass;
use decision_gate_core::InvariantReplayEngine;
use decision_gate_core::ReplayVerdict;
use decision_gate_core::SystemClock;
use decision_gate_core::TraceId;
use decision_gate_store_sqlite::SqliteArtifactStore;
use support::TRACE_ID;
use support::auth_context_value;
use support::envelope_hash_of;
use support::policy_decision_value;

#[test]
fn commits_and_replays_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("evidence.sqlite3");

    let auth_value = auth_context_value(TRACE_ID);
    let auth_hash = envelope_hash_of(&auth_value);
    let policy_value = policy_decision_value(TRACE_ID, &auth_hash, "allow");
    let policy_hash = envelope_hash_of(&policy_value);

    {
        let store = Arc::new(SqliteArtifactStore::open(&db_path).unwrap());
        let validator = Arc::new(JsonSchemaValidator::new().unwrap());
        let gate = CommitGate::new(store, validator);

        let auth_outcome = gate.commit("auth_context", &auth_hash, &auth_value).unwrap();
        assert!(auth_outcome.accepted);
        let policy_outcome = gate.commit("policy_decision", &policy_hash, &policy_value).unwrap();
        assert!(policy_outcome.accepted);
    }

    // Reopen as a fresh process would: a new connection over the same file.
    let store = Arc::new(SqliteArtifactStore::open(&db_path).unwrap());
    assert!(store.get_accepted(&auth_hash).unwrap().is_some());
    assert!(store.get_accepted(&policy_hash).unwrap().is_some());

    let validator = Arc::new(JsonSchemaValidator::new().unwrap());
    let clock = Arc::new(SystemClock);
    let engine = InvariantReplayEngine::new(store, validator, clock);
    let trace_id = TraceId::parse(TRACE_ID).unwrap();
    let outcome = engine.replay(&trace_id).unwrap();
    assert_eq!(outcome.record.result, ReplayVerdict::Pass);
}

#[test]
fn rejected_attempts_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("evidence.sqlite3");

    let ones = "1".repeat(64);
    let policy_value = support::policy_decision_with_hash(TRACE_ID, &ones, "allow");
    let policy_hash = envelope_hash_of(&policy_value);

    {
        let store = Arc::new(SqliteArtifactStore::open(&db_path).unwrap());
        let validator = Arc::new(JsonSchemaValidator::new().unwrap());
        let gate = CommitGate::new(store, validator);
        let outcome = gate.commit("policy_decision", &policy_hash, &policy_value).unwrap();
        assert_eq!(outcome.classification, FailureClass::MissingPrereq);
    }

    let store = SqliteArtifactStore::open(&db_path).unwrap();
    let rejected = store.get_rejected(&policy_hash).unwrap();
    assert!(rejected.is_some());
    assert_eq!(rejected.unwrap().failure_class, FailureClass::MissingPrereq);
}

#[test]
fn put_accepted_is_idempotent_by_hash() {
    let store = SqliteArtifactStore::open_in_memory().unwrap();
    let validator = Arc::new(JsonSchemaValidator::new().unwrap());
    let gate = CommitGate::new(Arc::new(store), validator);

    let auth_value = auth_context_value(TRACE_ID);
    let auth_hash = envelope_hash_of(&auth_value);

    let first = gate.commit("auth_context", &auth_hash, &auth_value).unwrap();
    let second = gate.commit("auth_context", &auth_hash, &auth_value).unwrap();
    assert!(first.accepted);
    assert!(second.accepted);
}
