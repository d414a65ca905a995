// decision-gate-core/src/runtime/replay/result.rs
// ============================================================================
// Module: Decision Gate Replay Result Emitter
// Description: The replay-result wire shape and the emitter that
//              canonicalizes, hashes, and stores every replay outcome.
// Purpose: Give replay runs the same content-addressed identity discipline
//          as envelope records, without treating them as envelope records
//          (they carry no `record_type` and never reach the commit gate).
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! A replay result is a logical outcome record, not an envelope: it has no
//! `record_type` and is never submitted through the commit gate (§3). It
//! still canonicalizes deterministically and is stored under its own hash,
//! so any caller can later fetch a replay result by hash to audit a run
//! (§4.10).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::CodecError;
use crate::core::Clock;
use crate::core::EnvelopeHash;
use crate::core::ErrorKind;
use crate::core::FailureClass;
use crate::core::TraceId;
use crate::core::canonical_json_bytes;
use crate::core::hash_bytes;
use crate::interfaces::ArtifactStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoredReplayResult;

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

/// Which replay engine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayType {
    /// Forensic replay: bit-exact re-verification.
    Forensic,
    /// Invariant replay: integrity and governance re-verification without
    /// execution.
    Invariant,
    /// Constrained replay: baseline/candidate comparison under a variance
    /// policy.
    Constrained,
}

/// Pass/fail verdict of a replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayVerdict {
    /// Every check the replay type performs succeeded.
    Pass,
    /// At least one check failed.
    Fail,
}

/// The closed replay-result shape (§3, §6). Canon revision 1 of this
/// workspace fixes the timestamp field as `generated_at_ms` (integer epoch
/// milliseconds), resolving the `generated_at` vs `generated_at_ms` open
/// question in favor of the millisecond-integer convention used everywhere
/// else in the record kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResultRecord {
    /// Which replay engine produced this result.
    pub replay_type: ReplayType,
    /// The trace this replay run targeted.
    pub target_trace_id: TraceId,
    /// Every envelope hash the replay run read as input, in the order the
    /// engine consumed them.
    pub input_envelope_hashes: Vec<EnvelopeHash>,
    /// Pass or fail.
    pub result: ReplayVerdict,
    /// The failure classification, present iff `result` is `fail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_class: Option<FailureClass>,
    /// The stable failure-kind string, present iff `result` is `fail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<ErrorKind>,
    /// Epoch millisecond generation timestamp.
    pub generated_at_ms: u64,
    /// Free-form diagnostic details. Must itself canonicalize
    /// deterministically, so engines build it from the same record types
    /// used elsewhere rather than ad hoc strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

// ============================================================================
// SECTION: Emitter
// ============================================================================

/// Errors raised while emitting a replay result.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The result record failed to canonicalize (should not happen for a
    /// well-formed [`ReplayResultRecord`]; surfaced rather than swallowed).
    #[error("replay result failed to canonicalize: {0}")]
    Codec(#[from] CodecError),
    /// The artifact store failed to persist the result.
    #[error("replay result store error: {0}")]
    Store(#[from] StoreError),
}

/// Canonicalizes, hashes, and stores a replay result, returning its
/// content-addressed hash alongside the record.
///
/// # Errors
///
/// Returns [`EmitError`] when canonicalization or storage fails.
pub fn emit(
    store: &Arc<dyn ArtifactStore + Send + Sync>,
    record: ReplayResultRecord,
) -> Result<(EnvelopeHash, ReplayResultRecord), EmitError> {
    let canonical_bytes = canonical_json_bytes(&record)?;
    let hash: EnvelopeHash = hash_bytes(&canonical_bytes).into();
    store.put_replay_result(StoredReplayResult {
        hash: hash.clone(),
        canonical_bytes,
        result: record.clone(),
    })?;
    Ok((hash, record))
}

/// Builds a passing replay result record, stamped with the given clock.
#[must_use]
pub fn pass_record(
    replay_type: ReplayType,
    target_trace_id: TraceId,
    input_envelope_hashes: Vec<EnvelopeHash>,
    clock: &(dyn Clock + Send + Sync),
) -> ReplayResultRecord {
    ReplayResultRecord {
        replay_type,
        target_trace_id,
        input_envelope_hashes,
        result: ReplayVerdict::Pass,
        failure_class: None,
        failure_kind: None,
        generated_at_ms: clock.now_ms(),
        details: None,
    }
}

/// Builds a failing replay result record, stamped with the given clock.
#[must_use]
pub fn fail_record(
    replay_type: ReplayType,
    target_trace_id: TraceId,
    input_envelope_hashes: Vec<EnvelopeHash>,
    failure_class: FailureClass,
    failure_kind: ErrorKind,
    details: Option<Value>,
    clock: &(dyn Clock + Send + Sync),
) -> ReplayResultRecord {
    ReplayResultRecord {
        replay_type,
        target_trace_id,
        input_envelope_hashes,
        result: ReplayVerdict::Fail,
        failure_class: Some(failure_class),
        failure_kind: Some(failure_kind),
        generated_at_ms: clock.now_ms(),
        details,
    }
}
