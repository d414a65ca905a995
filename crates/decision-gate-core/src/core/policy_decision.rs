// decision-gate-core/src/core/policy_decision.rs
// ============================================================================
// Module: Decision Gate Policy Decision Record
// Description: Allow/deny decision with policy identity and reason codes.
// Purpose: Model the `policy_decision` record kind, whose one prerequisite is
//          the `auth_context` it was decided against.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A `policy_decision` references exactly one prerequisite: the
//! `auth_context` envelope hash it was evaluated against. Whether its
//! `decision.result` is `allow` gates every evidence record that cites it
//! (§4.5 step 9).

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EnvelopeHash;
use crate::core::identifiers::HexDigest;
use crate::core::identifiers::Resource;
use crate::core::identifiers::Token;
use crate::core::record::Producer;
use crate::core::record::TraceContext;
use crate::core::string_set::StringSet;

/// Policy identity referenced by a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRef {
    /// Policy identifier.
    pub policy_id: Token,
    /// Policy version.
    pub policy_version: Token,
    /// SHA-256 of the policy document's canonical form.
    pub policy_sha256: HexDigest,
}

/// The action and resource a policy decision was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRef {
    /// Action requested.
    pub action: Token,
    /// Resource the action targets.
    pub resource: Resource,
}

/// Allow/deny outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionResult {
    /// The action is permitted.
    Allow,
    /// The action is denied.
    Deny,
}

/// Decision outcome with reason codes and obligations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    /// Allow or deny.
    pub result: DecisionResult,
    /// Stable reason codes explaining the decision.
    pub reason_codes: StringSet,
    /// Obligations the caller must satisfy (e.g. on allow).
    pub obligations: StringSet,
}

/// `policy_decision` record: allow/deny with policy identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecisionRecord {
    /// Fixed spec version for this canon revision.
    pub spec_version: String,
    /// Fixed canon version for this canon revision.
    pub canon_version: String,
    /// Trace context shared by every record kind.
    pub trace: TraceContext,
    /// Producer identity.
    pub producer: Producer,
    /// Epoch millisecond timestamp of the decision.
    pub ts_ms: u64,
    /// Envelope hash of the `auth_context` this decision was evaluated
    /// against.
    pub auth_context_envelope_sha256: EnvelopeHash,
    /// Policy identity.
    pub policy: PolicyRef,
    /// Request evaluated.
    pub request: RequestRef,
    /// Decision outcome.
    pub decision: DecisionOutcome,
}
