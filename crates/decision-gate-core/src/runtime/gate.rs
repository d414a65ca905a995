// decision-gate-core/src/runtime/gate.rs
// ============================================================================
// Module: Decision Gate Commit Gate
// Description: The fixed-sequence validator that is the system's single
//              write aperture.
// Purpose: Accept or reject a submitted record against schema, hash
//          integrity, prerequisite existence, trace continuity, and
//          authorization, persisting either accepted or rejected-attempt
//          artifacts as evidence.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! [`CommitGate::commit`] runs the ten-step sequence exactly once per
//! submission and never reorders it. Every step either advances to the next
//! or returns a terminal [`CommitOutcome`]; there is no retry, no repair, no
//! partial persistence. A commit that fails after canonicalization still
//! persists a rejected-attempt artifact, because an absent rejection is
//! itself information the audit model depends on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::core::EnvelopeHash;
use crate::core::ErrorKind;
use crate::core::FailureClass;
use crate::core::Record;
use crate::core::RecordKind;
use crate::core::canonical_json_bytes;
use crate::core::hash_bytes;
use crate::interfaces::ArtifactStore;
use crate::interfaces::RejectedAttempt;
use crate::interfaces::SchemaValidator;
use crate::interfaces::StoreError;
use crate::interfaces::StoredArtifact;

// ============================================================================
// SECTION: Commit Outcome
// ============================================================================

/// The result of one [`CommitGate::commit`] call.
///
/// Outcomes are data, not exceptions (§7): the gate never panics or retries,
/// and every terminal state — accepted, rejected-attempt, or dropped — is
/// fully described by this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// Whether the record was accepted.
    pub accepted: bool,
    /// The failure classification (`Accept` when `accepted` is true).
    pub classification: FailureClass,
    /// The stable error-kind string, present on every non-accept outcome.
    pub error_kind: Option<ErrorKind>,
    /// The computed envelope hash, defined from step 5 onward.
    pub computed_envelope_hash: Option<EnvelopeHash>,
    /// The canonical bytes, defined from step 4 onward.
    pub canonical_bytes: Option<Vec<u8>>,
}

impl CommitOutcome {
    fn dropped(classification: FailureClass, error_kind: ErrorKind) -> Self {
        Self {
            accepted: false,
            classification,
            error_kind: Some(error_kind),
            computed_envelope_hash: None,
            canonical_bytes: None,
        }
    }

    fn schema_reject(error_kind: ErrorKind) -> Self {
        Self::dropped(FailureClass::SchemaReject, error_kind)
    }
}

// ============================================================================
// SECTION: Commit Gate
// ============================================================================

/// The fixed-sequence commit validator: the system's single write aperture.
///
/// `CommitGate` holds no mutable state of its own beyond the store and
/// validator it is constructed with, so it is `Clone + Send + Sync` whenever
/// both of those are, matching the concurrency model in §5.
#[derive(Clone)]
pub struct CommitGate {
    store: Arc<dyn ArtifactStore + Send + Sync>,
    validator: Arc<dyn SchemaValidator + Send + Sync>,
}

impl CommitGate {
    /// Builds a commit gate over the given store and schema validator.
    #[must_use]
    pub fn new(
        store: Arc<dyn ArtifactStore + Send + Sync>,
        validator: Arc<dyn SchemaValidator + Send + Sync>,
    ) -> Self {
        Self {
            store,
            validator,
        }
    }

    /// Returns the gate's artifact store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ArtifactStore + Send + Sync> {
        &self.store
    }

    /// Runs the ten-step commit sequence over a submitted record.
    ///
    /// `declared_kind` is the wire-level `record_type` string the caller
    /// asserts; `declared_hash` is the envelope hash the caller computed.
    /// Neither is trusted until validated against `value` itself.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the artifact store itself fails;
    /// every record-level rejection is represented in the returned
    /// [`CommitOutcome`], not as an `Err`.
    pub fn commit(
        &self,
        declared_kind: &str,
        declared_hash: &EnvelopeHash,
        value: &Value,
    ) -> Result<CommitOutcome, StoreError> {
        // Step 1: record-kind check.
        let Some(asserted_kind) = RecordKind::from_record_type(declared_kind) else {
            return Ok(CommitOutcome::dropped(
                FailureClass::RecordTypeForbidden,
                ErrorKind::record_type_forbidden(),
            ));
        };

        // Step 2: schema validation.
        let validated_kind = match self.validator.validate(value) {
            Ok(kind) => kind,
            Err(err) => return Ok(CommitOutcome::schema_reject(err.kind)),
        };

        // Step 3: payload-kind agreement.
        if validated_kind != asserted_kind {
            return Ok(CommitOutcome::schema_reject(
                ErrorKind::schema_record_type_mismatch(),
            ));
        }

        // Step 4: canonicalize.
        let canonical_bytes = match canonical_json_bytes(value) {
            Ok(bytes) => bytes,
            Err(_) => {
                return Ok(CommitOutcome::schema_reject(
                    ErrorKind::schema_canonicalization(),
                ));
            }
        };

        // Step 5: hash.
        let computed_hash: EnvelopeHash = hash_bytes(&canonical_bytes).into();

        // A record that reaches here has canonical bytes, so its identity is
        // defined regardless of what happens next. Parse the validated value
        // into the closed record sum type for the remaining steps.
        let Ok(record) = serde_json::from_value::<Record>(value.clone()) else {
            return Ok(CommitOutcome::schema_reject(
                ErrorKind::schema_canonicalization(),
            ));
        };

        // Step 6: hash comparison.
        if *declared_hash != computed_hash {
            let outcome = self.reject(
                computed_hash.clone(),
                canonical_bytes.clone(),
                validated_kind,
                record,
                FailureClass::HashMismatch,
                ErrorKind::hash_mismatch_envelope(),
            )?;
            return Ok(outcome);
        }

        // Step 7: prerequisite resolution.
        let prereqs = match self.resolve_prerequisites(&record) {
            Ok(prereqs) => prereqs,
            Err((class, kind)) => {
                let outcome =
                    self.reject(computed_hash, canonical_bytes, validated_kind, record, class, kind)?;
                return Ok(outcome);
            }
        };

        // Step 8: trace continuity.
        let this_trace = &record.trace().trace_id;
        if prereqs
            .iter()
            .any(|prereq| &prereq.record.trace().trace_id != this_trace)
        {
            let outcome = self.reject(
                computed_hash,
                canonical_bytes,
                validated_kind,
                record,
                FailureClass::TraceViolation,
                ErrorKind::trace_violation_mismatch(),
            )?;
            return Ok(outcome);
        }

        // Step 9: authorization.
        if let Some(policy) = prereqs
            .iter()
            .find_map(|prereq| match &prereq.record {
                Record::PolicyDecision(policy) => Some(policy),
                _ => None,
            })
        {
            if policy.decision.result != crate::core::DecisionResult::Allow {
                let outcome = self.reject(
                    computed_hash,
                    canonical_bytes,
                    validated_kind,
                    record,
                    FailureClass::UnauthorizedExecution,
                    ErrorKind::unauthorized_policy_denied(),
                )?;
                return Ok(outcome);
            }
        }

        // Step 10: persist accepted.
        self.store.put_accepted(StoredArtifact {
            hash: computed_hash.clone(),
            canonical_bytes: canonical_bytes.clone(),
            kind: validated_kind,
            record,
        })?;

        Ok(CommitOutcome {
            accepted: true,
            classification: FailureClass::Accept,
            error_kind: None,
            computed_envelope_hash: Some(computed_hash),
            canonical_bytes: Some(canonical_bytes),
        })
    }

    fn reject(
        &self,
        hash: EnvelopeHash,
        canonical_bytes: Vec<u8>,
        kind: RecordKind,
        record: Record,
        classification: FailureClass,
        error_kind: ErrorKind,
    ) -> Result<CommitOutcome, StoreError> {
        self.store.put_rejected(RejectedAttempt {
            hash: hash.clone(),
            canonical_bytes: canonical_bytes.clone(),
            kind,
            record,
            failure_class: classification,
            error_kind: error_kind.clone(),
        })?;
        Ok(CommitOutcome {
            accepted: false,
            classification,
            error_kind: Some(error_kind),
            computed_envelope_hash: Some(hash),
            canonical_bytes: Some(canonical_bytes),
        })
    }

    /// Resolves a record's prerequisites per its kind, returning the
    /// resolved artifacts in no particular order.
    fn resolve_prerequisites(
        &self,
        record: &Record,
    ) -> Result<Vec<StoredArtifact>, (FailureClass, ErrorKind)> {
        let missing_auth = || (FailureClass::MissingPrereq, ErrorKind::missing_prereq_auth_context());
        let missing_policy =
            || (FailureClass::MissingPrereq, ErrorKind::missing_prereq_policy_decision());

        match record {
            Record::AuthContext(_) => Ok(Vec::new()),
            Record::PolicyDecision(policy) => {
                let auth = self
                    .lookup(&policy.auth_context_envelope_sha256)
                    .map_err(|_| missing_auth())?
                    .ok_or_else(missing_auth)?;
                Ok(vec![auth])
            }
            Record::ModelCall(call) => {
                let auth = self
                    .lookup(&call.common.auth_context_envelope_sha256)
                    .map_err(|_| missing_auth())?
                    .ok_or_else(missing_auth)?;
                let policy = self
                    .lookup(&call.common.policy_decision_envelope_sha256)
                    .map_err(|_| missing_policy())?
                    .ok_or_else(missing_policy)?;
                Ok(vec![auth, policy])
            }
            Record::ToolCall(call) => {
                let auth = self
                    .lookup(&call.common.auth_context_envelope_sha256)
                    .map_err(|_| missing_auth())?
                    .ok_or_else(missing_auth)?;
                let policy = self
                    .lookup(&call.common.policy_decision_envelope_sha256)
                    .map_err(|_| missing_policy())?
                    .ok_or_else(missing_policy)?;
                Ok(vec![auth, policy])
            }
        }
    }

    fn lookup(&self, hash: &EnvelopeHash) -> Result<Option<StoredArtifact>, StoreError> {
        self.store.get_accepted(hash)
    }
}
