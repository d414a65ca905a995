// decision-gate-core/src/runtime/replay/invariant.rs
// ============================================================================
// Module: Decision Gate Invariant Replay Engine
// Description: Re-verifies integrity and governance invariants for a trace
//              without execution.
// Purpose: Prove that a stored chain still satisfies every cross-reference,
//          trace-continuity, and authorization invariant it did when first
//          accepted, without re-running any model or tool.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Each check below short-circuits on first failure (§4.7, §7 "Replay
//! propagation"): the engine reports the first failing class it finds and
//! does not continue enumerating further problems.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;

use crate::core::Clock;
use crate::core::EnvelopeHash;
use crate::core::ErrorKind;
use crate::core::FailureClass;
use crate::core::Record;
use crate::core::TraceId;
use crate::core::canonical_json_bytes;
use crate::core::hash_bytes;
use crate::interfaces::ArtifactStore;
use crate::interfaces::SchemaValidator;
use crate::interfaces::StoreError;
use crate::interfaces::StoredArtifact;
use crate::runtime::ReplayOutcome;
use crate::runtime::TraceIndex;
use crate::runtime::replay::result::ReplayType;
use crate::runtime::replay::result::emit;
use crate::runtime::replay::result::fail_record;
use crate::runtime::replay::result::pass_record;

// ============================================================================
// SECTION: Invariant Replay Engine
// ============================================================================

/// Verifies a trace's accepted chain without executing anything.
#[derive(Clone)]
pub struct InvariantReplayEngine {
    store: Arc<dyn ArtifactStore + Send + Sync>,
    validator: Arc<dyn SchemaValidator + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InvariantReplayEngine {
    /// Builds an invariant replay engine.
    #[must_use]
    pub fn new(
        store: Arc<dyn ArtifactStore + Send + Sync>,
        validator: Arc<dyn SchemaValidator + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            store,
            validator,
            clock,
        }
    }

    /// Runs invariant replay over the accepted chain for `trace_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store or emitter fails; every
    /// replay-level verdict is represented in the returned [`ReplayOutcome`].
    pub fn replay(&self, trace_id: &TraceId) -> Result<ReplayOutcome, StoreError> {
        let index = TraceIndex::new(self.store.clone());
        let chain = index.resolve(trace_id, false)?;

        let Some(chain) = chain else {
            let record = fail_record(
                ReplayType::Invariant,
                trace_id.clone(),
                Vec::new(),
                FailureClass::ReplayChainNotFound,
                ErrorKind::replay_chain_not_found(),
                None,
                self.clock.as_ref(),
            );
            let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
            return Ok(ReplayOutcome { hash, record });
        };

        let accepted: Vec<StoredArtifact> = chain.accepted().cloned().collect();
        let input_hashes: Vec<EnvelopeHash> =
            accepted.iter().map(|artifact| artifact.hash.clone()).collect();

        if let Some((class, kind, details)) = self.first_violation(trace_id, &accepted)? {
            let record = fail_record(
                ReplayType::Invariant,
                trace_id.clone(),
                input_hashes,
                class,
                kind,
                Some(details),
                self.clock.as_ref(),
            );
            let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
            return Ok(ReplayOutcome { hash, record });
        }

        let record = pass_record(
            ReplayType::Invariant,
            trace_id.clone(),
            input_hashes,
            self.clock.as_ref(),
        );
        let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
        Ok(ReplayOutcome { hash, record })
    }

    /// Returns the first violation found across `accepted`, or `None` if
    /// every invariant holds.
    fn first_violation(
        &self,
        trace_id: &TraceId,
        accepted: &[StoredArtifact],
    ) -> Result<Option<(FailureClass, ErrorKind, serde_json::Value)>, StoreError> {
        for artifact in accepted {
            if let Some(violation) = self.check_one(trace_id, artifact)? {
                return Ok(Some(violation));
            }
        }
        Ok(None)
    }

    fn check_one(
        &self,
        trace_id: &TraceId,
        artifact: &StoredArtifact,
    ) -> Result<Option<(FailureClass, ErrorKind, serde_json::Value)>, StoreError> {
        let details = |message: &str| json!({ "envelope_hash": artifact.hash.as_str(), "message": message });

        // Schema re-validation and canonical-hash re-verification.
        let as_value = match serde_json::to_value(&artifact.record) {
            Ok(value) => value,
            Err(_) => {
                return Ok(Some((
                    FailureClass::SchemaReject,
                    ErrorKind::schema_canonicalization(),
                    details("record failed to re-serialize"),
                )));
            }
        };
        if self.validator.validate(&as_value).is_err() {
            return Ok(Some((
                FailureClass::SchemaReject,
                ErrorKind::schema_canonicalization(),
                details("record no longer validates against its schema"),
            )));
        }
        let recomputed = match canonical_json_bytes(&as_value) {
            Ok(bytes) => bytes,
            Err(_) => {
                return Ok(Some((
                    FailureClass::HashMismatch,
                    ErrorKind::hash_mismatch_canonical_json(),
                    details("record failed to canonicalize on replay"),
                )));
            }
        };
        if hash_bytes(&recomputed).as_str() != artifact.hash.as_str() {
            return Ok(Some((
                FailureClass::HashMismatch,
                ErrorKind::hash_mismatch_envelope(),
                details("recomputed hash disagrees with stored key"),
            )));
        }

        // trace_id agreement.
        if artifact.record.trace().trace_id != *trace_id {
            return Ok(Some((
                FailureClass::TraceViolation,
                ErrorKind::trace_violation_mismatch(),
                details("record trace_id disagrees with requested trace"),
            )));
        }

        // Cross-reference and authorization re-verification.
        match &artifact.record {
            Record::AuthContext(_) => Ok(None),
            Record::PolicyDecision(policy) => {
                self.check_auth_prereq(trace_id, &policy.auth_context_envelope_sha256, &details)
            }
            Record::ModelCall(call) => self.check_evidence_prereqs(
                trace_id,
                &call.common.auth_context_envelope_sha256,
                &call.common.policy_decision_envelope_sha256,
                &details,
            ),
            Record::ToolCall(call) => self.check_evidence_prereqs(
                trace_id,
                &call.common.auth_context_envelope_sha256,
                &call.common.policy_decision_envelope_sha256,
                &details,
            ),
        }
    }

    fn check_auth_prereq(
        &self,
        trace_id: &TraceId,
        auth_hash: &EnvelopeHash,
        details: &impl Fn(&str) -> serde_json::Value,
    ) -> Result<Option<(FailureClass, ErrorKind, serde_json::Value)>, StoreError> {
        let Some(auth) = self.store.get_accepted(auth_hash)? else {
            return Ok(Some((
                FailureClass::MissingPrereq,
                ErrorKind::missing_prereq_auth_context(),
                details("referenced auth_context is absent"),
            )));
        };
        if auth.record.trace().trace_id != *trace_id {
            return Ok(Some((
                FailureClass::TraceViolation,
                ErrorKind::trace_violation_mismatch(),
                details("referenced auth_context disagrees on trace_id"),
            )));
        }
        Ok(None)
    }

    fn check_evidence_prereqs(
        &self,
        trace_id: &TraceId,
        auth_hash: &EnvelopeHash,
        policy_hash: &EnvelopeHash,
        details: &impl Fn(&str) -> serde_json::Value,
    ) -> Result<Option<(FailureClass, ErrorKind, serde_json::Value)>, StoreError> {
        let Some(auth) = self.store.get_accepted(auth_hash)? else {
            return Ok(Some((
                FailureClass::MissingPrereq,
                ErrorKind::missing_prereq_auth_context(),
                details("referenced auth_context is absent"),
            )));
        };
        if auth.record.trace().trace_id != *trace_id {
            return Ok(Some((
                FailureClass::TraceViolation,
                ErrorKind::trace_violation_mismatch(),
                details("referenced auth_context disagrees on trace_id"),
            )));
        }

        let Some(policy_artifact) = self.store.get_accepted(policy_hash)? else {
            return Ok(Some((
                FailureClass::MissingPrereq,
                ErrorKind::missing_prereq_policy_decision(),
                details("referenced policy_decision is absent"),
            )));
        };
        if policy_artifact.record.trace().trace_id != *trace_id {
            return Ok(Some((
                FailureClass::TraceViolation,
                ErrorKind::trace_violation_mismatch(),
                details("referenced policy_decision disagrees on trace_id"),
            )));
        }
        let Record::PolicyDecision(policy) = &policy_artifact.record else {
            return Ok(Some((
                FailureClass::MissingPrereq,
                ErrorKind::missing_prereq_policy_decision(),
                details("referenced hash does not resolve to a policy_decision"),
            )));
        };
        if policy.decision.result != crate::core::DecisionResult::Allow {
            return Ok(Some((
                FailureClass::UnauthorizedExecution,
                ErrorKind::unauthorized_policy_denied(),
                details("referenced policy_decision no longer allows this action"),
            )));
        }
        Ok(None)
    }
}

fn to_store_error(err: crate::runtime::replay::result::EmitError) -> StoreError {
    match err {
        crate::runtime::replay::result::EmitError::Codec(err) => {
            StoreError::Io(format!("replay result codec error: {err}"))
        }
        crate::runtime::replay::result::EmitError::Store(err) => err,
    }
}
