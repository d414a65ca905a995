// decision-gate-core/src/runtime/replay/constrained.rs
// ============================================================================
// Module: Decision Gate Constrained Replay Engine
// Description: Compares a baseline and a candidate trace under an explicit
//              variance policy.
// Purpose: Certify that a re-run whose model/tool responses legitimately
//          differ still took an equivalent governance path.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Two traces are governance-equivalent when they took the same sequence of
//! policy decisions and the same set of evidence calls, differing at most in
//! the response each evidence call produced — and then only where both the
//! record and the variance policy permit it (§4.9).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use crate::core::Clock;
use crate::core::ContentRef;
use crate::core::DecisionResult;
use crate::core::EnvelopeHash;
use crate::core::ErrorKind;
use crate::core::FailureClass;
use crate::core::PolicyDecisionRecord;
use crate::core::Record;
use crate::core::TraceId;
use crate::core::VariancePolicy;
use crate::interfaces::ArtifactStore;
use crate::interfaces::SchemaValidator;
use crate::interfaces::StoreError;
use crate::interfaces::StoredArtifact;
use crate::runtime::ReplayOutcome;
use crate::runtime::TraceIndex;
use crate::runtime::replay::invariant::InvariantReplayEngine;
use crate::runtime::replay::result::ReplayType;
use crate::runtime::replay::result::ReplayVerdict;
use crate::runtime::replay::result::emit;
use crate::runtime::replay::result::fail_record;
use crate::runtime::replay::result::pass_record;

// ============================================================================
// SECTION: Constrained Replay Engine
// ============================================================================

/// Compares baseline and candidate traces under a variance policy.
#[derive(Clone)]
pub struct ConstrainedReplayEngine {
    store: Arc<dyn ArtifactStore + Send + Sync>,
    invariant: InvariantReplayEngine,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ConstrainedReplayEngine {
    /// Builds a constrained replay engine.
    #[must_use]
    pub fn new(
        store: Arc<dyn ArtifactStore + Send + Sync>,
        validator: Arc<dyn SchemaValidator + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            invariant: InvariantReplayEngine::new(store.clone(), validator, clock.clone()),
            store,
            clock,
        }
    }

    /// Runs constrained replay comparing `baseline_id` against
    /// `candidate_id` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store or emitter fails.
    pub fn replay(
        &self,
        baseline_id: &TraceId,
        candidate_id: &TraceId,
        policy: &VariancePolicy,
    ) -> Result<ReplayOutcome, StoreError> {
        // Pre-checks: both traces must pass invariant replay.
        for trace_id in [baseline_id, candidate_id] {
            let outcome = self.invariant.replay(trace_id)?;
            if outcome.record.result == ReplayVerdict::Fail {
                let record = fail_record(
                    ReplayType::Constrained,
                    baseline_id.clone(),
                    outcome.record.input_envelope_hashes.clone(),
                    outcome.record.failure_class.unwrap_or(FailureClass::SchemaReject),
                    outcome
                        .record
                        .failure_kind
                        .clone()
                        .unwrap_or_else(ErrorKind::schema_canonicalization),
                    outcome.record.details.clone(),
                    self.clock.as_ref(),
                );
                let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
                return Ok(ReplayOutcome { hash, record });
            }
        }

        let index = TraceIndex::new(self.store.clone());
        let Some(baseline_chain) = index.resolve(baseline_id, false)? else {
            return Err(StoreError::Io("baseline chain vanished mid-replay".to_string()));
        };
        let Some(candidate_chain) = index.resolve(candidate_id, false)? else {
            return Err(StoreError::Io("candidate chain vanished mid-replay".to_string()));
        };

        let baseline: Vec<StoredArtifact> = baseline_chain.accepted().cloned().collect();
        let candidate: Vec<StoredArtifact> = candidate_chain.accepted().cloned().collect();
        let input_hashes: Vec<EnvelopeHash> = baseline
            .iter()
            .chain(candidate.iter())
            .map(|artifact| artifact.hash.clone())
            .collect();

        // Policy-path equivalence.
        let baseline_policy_sigs = policy_signatures(&baseline);
        let candidate_policy_sigs = policy_signatures(&candidate);
        if baseline_policy_sigs != candidate_policy_sigs {
            return self.policy_path_mismatch(baseline_id, input_hashes, "policy decision paths differ");
        }

        // Evidence identity equivalence.
        let policy_sig_by_hash = policy_signature_by_hash(&baseline)
            .into_iter()
            .chain(policy_signature_by_hash(&candidate))
            .collect::<BTreeMap<_, _>>();
        let baseline_groups = evidence_groups(&baseline, &policy_sig_by_hash);
        let candidate_groups = evidence_groups(&candidate, &policy_sig_by_hash);
        let baseline_shape: Vec<(String, usize)> =
            baseline_groups.iter().map(|(k, v)| (k.clone(), v.len())).collect();
        let candidate_shape: Vec<(String, usize)> =
            candidate_groups.iter().map(|(k, v)| (k.clone(), v.len())).collect();
        if baseline_shape != candidate_shape {
            return self.policy_path_mismatch(baseline_id, input_hashes, "evidence call identities differ");
        }

        // Variance enforcement over matched pairs.
        let mut allowed_differences = Vec::new();
        for (identity, baseline_entries) in &baseline_groups {
            let candidate_entries = &candidate_groups[identity];
            for (baseline_artifact, candidate_artifact) in
                baseline_entries.iter().copied().zip(candidate_entries.iter().copied())
            {
                let Some((baseline_response, is_model, allow_blobref)) = evidence_response(baseline_artifact)
                else {
                    continue;
                };
                let Some((candidate_response, _, candidate_allow_blobref)) =
                    evidence_response(candidate_artifact)
                else {
                    continue;
                };
                if baseline_response == candidate_response {
                    continue;
                }
                let policy_allows = if is_model {
                    policy.allow_model_call_variance
                } else {
                    policy.allow_tool_call_variance
                };
                if !(allow_blobref && candidate_allow_blobref && policy_allows) {
                    let record = fail_record(
                        ReplayType::Constrained,
                        baseline_id.clone(),
                        input_hashes,
                        FailureClass::ReplayVarianceViolation,
                        ErrorKind::replay_variance_violation(),
                        Some(json!({
                            "identity": identity,
                            "baseline_envelope_hash": baseline_artifact.hash.as_str(),
                            "candidate_envelope_hash": candidate_artifact.hash.as_str(),
                        })),
                        self.clock.as_ref(),
                    );
                    let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
                    return Ok(ReplayOutcome { hash, record });
                }
                allowed_differences.push(json!({
                    "identity": identity,
                    "baseline_envelope_hash": baseline_artifact.hash.as_str(),
                    "candidate_envelope_hash": candidate_artifact.hash.as_str(),
                }));
            }
        }

        let mut record = pass_record(
            ReplayType::Constrained,
            baseline_id.clone(),
            input_hashes,
            self.clock.as_ref(),
        );
        if !allowed_differences.is_empty() {
            record.details = Some(json!({ "allowed_differences": allowed_differences }));
        }
        let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
        Ok(ReplayOutcome { hash, record })
    }

    fn policy_path_mismatch(
        &self,
        target_trace_id: &TraceId,
        input_hashes: Vec<EnvelopeHash>,
        message: &str,
    ) -> Result<ReplayOutcome, StoreError> {
        let record = fail_record(
            ReplayType::Constrained,
            target_trace_id.clone(),
            input_hashes,
            FailureClass::ReplayPolicyPathMismatch,
            ErrorKind::replay_policy_path_mismatch(),
            Some(json!({ "message": message })),
            self.clock.as_ref(),
        );
        let (hash, record) = emit(&self.store, record).map_err(to_store_error)?;
        Ok(ReplayOutcome { hash, record })
    }
}

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// `(policy_id, policy_version, policy_sha256, action, resource, result,
/// sorted reason-code keys, sorted obligation keys)` rendered as one string.
fn policy_signature(policy: &PolicyDecisionRecord) -> String {
    let reason_codes: Vec<&str> = policy.decision.reason_codes.iter().collect();
    let obligations: Vec<&str> = policy.decision.obligations.iter().collect();
    let result = match policy.decision.result {
        DecisionResult::Allow => "allow",
        DecisionResult::Deny => "deny",
    };
    format!(
        "{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}",
        policy.policy.policy_id,
        policy.policy.policy_version,
        policy.policy.policy_sha256,
        policy.request.action,
        policy.request.resource,
        result,
        reason_codes.join(","),
        obligations.join(","),
    )
}

fn policy_signatures(chain: &[StoredArtifact]) -> Vec<String> {
    let mut sigs: Vec<String> = chain
        .iter()
        .filter_map(|artifact| match &artifact.record {
            Record::PolicyDecision(policy) => Some(policy_signature(policy)),
            _ => None,
        })
        .collect();
    sigs.sort();
    sigs
}

fn policy_signature_by_hash(chain: &[StoredArtifact]) -> BTreeMap<String, String> {
    chain
        .iter()
        .filter_map(|artifact| match &artifact.record {
            Record::PolicyDecision(policy) => {
                Some((artifact.hash.as_str().to_string(), policy_signature(policy)))
            }
            _ => None,
        })
        .collect()
}

/// Evidence identity: `(kind, tool/model identifiers, request reference,
/// policy-decision signature of its referenced policy)`.
fn evidence_identity(
    kind: &str,
    identifier: &str,
    identifier_version: &str,
    request: &ContentRef,
    policy_sig: &str,
) -> String {
    format!(
        "{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}",
        kind,
        identifier,
        identifier_version,
        request.content_type,
        request.sha256,
        request.size_bytes,
        policy_sig,
    )
}

fn evidence_groups<'a>(
    chain: &'a [StoredArtifact],
    policy_sig_by_hash: &BTreeMap<String, String>,
) -> BTreeMap<String, Vec<&'a StoredArtifact>> {
    let mut groups: BTreeMap<String, Vec<&'a StoredArtifact>> = BTreeMap::new();
    for artifact in chain {
        let identity = match &artifact.record {
            Record::ModelCall(call) => {
                let policy_sig = policy_sig_by_hash
                    .get(call.common.policy_decision_envelope_sha256.as_str())
                    .cloned()
                    .unwrap_or_default();
                Some(evidence_identity(
                    "model_call",
                    call.model.model_id.as_str(),
                    call.model.model_version.as_str(),
                    &call.common.request,
                    &policy_sig,
                ))
            }
            Record::ToolCall(call) => {
                let policy_sig = policy_sig_by_hash
                    .get(call.common.policy_decision_envelope_sha256.as_str())
                    .cloned()
                    .unwrap_or_default();
                Some(evidence_identity(
                    "tool_call",
                    call.tool.tool_id.as_str(),
                    call.tool.tool_version.as_str(),
                    &call.common.request,
                    &policy_sig,
                ))
            }
            Record::AuthContext(_) | Record::PolicyDecision(_) => None,
        };
        if let Some(identity) = identity {
            groups.entry(identity).or_default().push(artifact);
        }
    }
    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.hash.as_str().cmp(b.hash.as_str()));
    }
    groups
}

/// Returns `(response_ref, is_model_call, allow_response_blobref)` for an
/// evidence artifact, or `None` if `artifact` is not a `model_call` or
/// `tool_call` (never the case for artifacts produced by [`evidence_groups`]).
fn evidence_response(artifact: &StoredArtifact) -> Option<(&ContentRef, bool, bool)> {
    match &artifact.record {
        Record::ModelCall(call) => Some((&call.common.response, true, call.common.allow_response_blobref)),
        Record::ToolCall(call) => Some((&call.common.response, false, call.common.allow_response_blobref)),
        Record::AuthContext(_) | Record::PolicyDecision(_) => None,
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
