// decision-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Decision Gate In-Memory Artifact Store
// Description: Mutex-guarded, content-addressed store for tests, demos, and
//              as the default backing for every replay engine.
// Purpose: Provide the reference `ArtifactStore` implementation: three
//          append-only namespaces keyed by envelope hash.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The store is the only shared mutable resource in the system (§5). This
//! implementation admits concurrent readers and serializes writers with one
//! mutex per namespace, giving regime (b) from "Concurrent commits": a
//! compare-and-insert keyed by envelope hash, so two commits racing to accept
//! the same record converge on one stored artifact instead of racing each
//! other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::EnvelopeHash;
use crate::core::TraceId;
use crate::interfaces::ArtifactStore;
use crate::interfaces::RejectedAttempt;
use crate::interfaces::StoreError;
use crate::interfaces::StoredArtifact;
use crate::interfaces::StoredReplayResult;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory, content-addressed artifact store.
///
/// The reference implementation: used by the commit gate and every replay
/// engine in tests, and suitable for any single-process deployment that does
/// not need artifacts to survive a restart.
#[derive(Debug, Default, Clone)]
pub struct InMemoryArtifactStore {
    accepted: Arc<Mutex<BTreeMap<EnvelopeHash, StoredArtifact>>>,
    rejected: Arc<Mutex<BTreeMap<EnvelopeHash, RejectedAttempt>>>,
    replay_results: Arc<Mutex<BTreeMap<EnvelopeHash, StoredReplayResult>>>,
}

impl InMemoryArtifactStore {
    /// Creates a new, empty in-memory artifact store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(namespace: &str) -> StoreError {
    StoreError::Poisoned(format!("{namespace} mutex poisoned"))
}

impl ArtifactStore for InMemoryArtifactStore {
    fn get_accepted(&self, hash: &EnvelopeHash) -> Result<Option<StoredArtifact>, StoreError> {
        let guard = self.accepted.lock().map_err(|_| poisoned("accepted"))?;
        Ok(guard.get(hash).cloned())
    }

    fn put_accepted(&self, artifact: StoredArtifact) -> Result<(), StoreError> {
        let mut guard = self.accepted.lock().map_err(|_| poisoned("accepted"))?;
        guard.entry(artifact.hash.clone()).or_insert(artifact);
        Ok(())
    }

    fn accepted_by_trace(&self, trace_id: &TraceId) -> Result<Vec<StoredArtifact>, StoreError> {
        let guard = self.accepted.lock().map_err(|_| poisoned("accepted"))?;
        Ok(guard
            .values()
            .filter(|artifact| artifact.record.trace().trace_id == *trace_id)
            .cloned()
            .collect())
    }

    fn get_rejected(&self, hash: &EnvelopeHash) -> Result<Option<RejectedAttempt>, StoreError> {
        let guard = self.rejected.lock().map_err(|_| poisoned("rejected"))?;
        Ok(guard.get(hash).cloned())
    }

    fn put_rejected(&self, attempt: RejectedAttempt) -> Result<(), StoreError> {
        let mut guard = self.rejected.lock().map_err(|_| poisoned("rejected"))?;
        guard.entry(attempt.hash.clone()).or_insert(attempt);
        Ok(())
    }

    fn rejected_by_trace(&self, trace_id: &TraceId) -> Result<Vec<RejectedAttempt>, StoreError> {
        let guard = self.rejected.lock().map_err(|_| poisoned("rejected"))?;
        Ok(guard
            .values()
            .filter(|attempt| attempt.record.trace().trace_id == *trace_id)
            .cloned()
            .collect())
    }

    fn get_replay_result(
        &self,
        hash: &EnvelopeHash,
    ) -> Result<Option<StoredReplayResult>, StoreError> {
        let guard = self
            .replay_results
            .lock()
            .map_err(|_| poisoned("replay_results"))?;
        Ok(guard.get(hash).cloned())
    }

    fn put_replay_result(&self, artifact: StoredReplayResult) -> Result<(), StoreError> {
        let mut guard = self
            .replay_results
            .lock()
            .map_err(|_| poisoned("replay_results"))?;
        guard.entry(artifact.hash.clone()).or_insert(artifact);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AuthContextRecord;
    use crate::core::Record;
    use crate::core::RecordKind;

    fn sample_artifact(hash: &str, trace_id: &str) -> StoredArtifact {
        let json = format!(
            r#"{{"record_type":"auth_context","spec_version":"1.0.0","canon_version":"1","trace":{{"trace_id":"{trace_id}","span_id":"00f067aa0ba902b7","span_kind":"root"}},"producer":{{"layer":"gateway","component":"ingress"}},"ts_ms":1769817600000,"actor":{{"actor_kind":"human","actor_id":"u1"}},"credential":{{"credential_kind":"oauth_token","issuer":"idp","presented_hash_sha256":"{h64}","verified_at_ms":1,"expires_at_ms":2}},"grants":{{}}}}"#,
            h64 = "a".repeat(64),
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record: Record = serde_json::from_value(value.clone()).unwrap();
        StoredArtifact {
            hash: EnvelopeHash::parse(hash).unwrap(),
            canonical_bytes: serde_json::to_vec(&value).unwrap(),
            kind: RecordKind::AuthContext,
            record,
        }
    }

    #[test]
    fn put_accepted_is_idempotent_by_hash() {
        let store = InMemoryArtifactStore::new();
        let hash = "b".repeat(64);
        store
            .put_accepted(sample_artifact(&hash, "4bf92f3577b34da6a3ce929d0e0e4736"))
            .unwrap();
        store
            .put_accepted(sample_artifact(&hash, "4bf92f3577b34da6a3ce929d0e0e4736"))
            .unwrap();
        let fetched = store
            .get_accepted(&EnvelopeHash::parse(hash).unwrap())
            .unwrap();
        assert!(fetched.is_some());
    }

    #[test]
    fn accepted_by_trace_filters_correctly() {
        let store = InMemoryArtifactStore::new();
        let trace = "4bf92f3577b34da6a3ce929d0e0e4736";
        store
            .put_accepted(sample_artifact(&"c".repeat(64), trace))
            .unwrap();
        store
            .put_accepted(sample_artifact(&"d".repeat(64), "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"))
            .unwrap();
        let matches = store
            .accepted_by_trace(&TraceId::parse(trace).unwrap())
            .unwrap();
        assert_eq!(matches.len(), 1);
    }
}
