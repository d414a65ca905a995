// decision-gate-core/src/core/evidence_call.rs
// ============================================================================
// Module: Decision Gate Evidence Call Records
// Description: `model_call` and `tool_call` records: evidence of a model or
//              tool invocation, both referencing an `auth_context` and a
//              `policy_decision`.
// Purpose: Share the fields `model_call` and `tool_call` have in common
//          without collapsing them into one struct that could hold a model
//          identifier and a tool identifier at once.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Model and tool calls share every field except their kind-specific
//! identifier block and `model_call`'s optional `usage`. [`EvidenceCommon`]
//! holds the shared fields and is flattened into both
//! [`ModelCallRecord`] and [`ToolCallRecord`], so the wire shape stays one
//! flat JSON object per §6 while the Rust types keep a model call from ever
//! accidentally carrying a tool identifier.

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EnvelopeHash;
use crate::core::identifiers::Token;
use crate::core::record::ContentRef;
use crate::core::record::Producer;
use crate::core::record::TraceContext;

/// Fields shared by `model_call` and `tool_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCommon {
    /// Fixed spec version for this canon revision.
    pub spec_version: String,
    /// Fixed canon version for this canon revision.
    pub canon_version: String,
    /// Trace context shared by every record kind.
    pub trace: TraceContext,
    /// Producer identity.
    pub producer: Producer,
    /// Epoch millisecond timestamp the invocation started.
    pub started_at_ms: u64,
    /// Epoch millisecond timestamp the invocation ended.
    pub ended_at_ms: u64,
    /// Envelope hash of the `auth_context` prerequisite.
    pub auth_context_envelope_sha256: EnvelopeHash,
    /// Envelope hash of the `policy_decision` prerequisite.
    pub policy_decision_envelope_sha256: EnvelopeHash,
    /// Content-addressed reference to the request payload.
    pub request: ContentRef,
    /// Content-addressed reference to the response payload.
    pub response: ContentRef,
    /// Invocation outcome.
    pub outcome: OutcomeRef,
    /// Whether constrained replay may accept a differing `response`
    /// reference for this record. Defaults to `false`.
    #[serde(default)]
    pub allow_response_blobref: bool,
}

/// Invocation outcome status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRef {
    /// Outcome status token (`ok`, `error`, `timeout`, ...).
    pub status: Token,
}

/// Token usage for a model invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRef {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens produced.
    pub output_tokens: u64,
}

/// Model identifier block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    /// Model identifier.
    pub model_id: Token,
    /// Model version.
    pub model_version: Token,
}

/// Tool identifier block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    /// Tool identifier.
    pub tool_id: Token,
    /// Tool version.
    pub tool_version: Token,
}

/// `model_call` record: evidence of a model invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCallRecord {
    /// Fields shared with `tool_call`.
    #[serde(flatten)]
    pub common: EvidenceCommon,
    /// Model identifier block.
    pub model: ModelRef,
    /// Optional token usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageRef>,
}

/// `tool_call` record: evidence of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Fields shared with `model_call`.
    #[serde(flatten)]
    pub common: EvidenceCommon,
    /// Tool identifier block.
    pub tool: ToolRef,
}

/// Shared accessors for the two evidence-call record kinds.
pub trait EvidenceCall {
    /// Returns the fields shared with the other evidence-call kind.
    fn common(&self) -> &EvidenceCommon;
}

impl EvidenceCall for ModelCallRecord {
    fn common(&self) -> &EvidenceCommon {
        &self.common
    }
}

impl EvidenceCall for ToolCallRecord {
    fn common(&self) -> &EvidenceCommon {
        &self.common
    }
}
