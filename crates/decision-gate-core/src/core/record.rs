// decision-gate-core/src/core/record.rs
// ============================================================================
// Module: Decision Gate Record Envelope
// Description: The closed sum type of four commit-able record kinds, their
//              shared trace context, and the content-addressed reference
//              shape used for large payload fields.
// Purpose: Model "record_type appears exactly once and matches the
//          kind-specific schema" as a Rust sum type instead of an open map,
//          removing the whole class of field-present-on-wrong-kind bugs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The specification's data model names five record kinds, but only four are
//! ever submitted through the commit gate: `auth_context`, `policy_decision`,
//! `model_call`, and `tool_call`. The fifth, a replay result, is a logical
//! outcome record with no envelope and never reaches this type (see
//! [`crate::runtime::replay`]). [`Record`] is the tagged union of the four
//! commit-able kinds; [`RecordKind`] is the closed set a caller declares when
//! submitting to the gate, checked against the payload's own `record_type`
//! at commit step 3.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::auth_context::AuthContextRecord;
use crate::core::evidence_call::EvidenceCall;
use crate::core::evidence_call::ModelCallRecord;
use crate::core::evidence_call::ToolCallRecord;
use crate::core::identifiers::HexDigest;
use crate::core::identifiers::SpanId;
use crate::core::identifiers::Token;
use crate::core::identifiers::TraceId;
use crate::core::policy_decision::PolicyDecisionRecord;

// ============================================================================
// SECTION: Canon Constants
// ============================================================================

/// Fixed `spec_version` for this canon revision.
pub const SPEC_VERSION: &str = "1.0.0";

/// Fixed `canon_version` for this canon revision.
pub const CANON_VERSION: &str = "1";

// ============================================================================
// SECTION: Trace Context
// ============================================================================

/// Trace context shared by every record kind.
///
/// # Invariants
/// - All records in one chain carry the same `trace_id`.
/// - `parent_span_id`, when present, identifies a span within the same trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// 32 lowercase hex character trace identifier, non-zero.
    pub trace_id: TraceId,
    /// 16 lowercase hex character span identifier, non-zero.
    pub span_id: SpanId,
    /// Free-form span kind label (e.g. `root`, `child`).
    pub span_kind: Token,
    /// Parent span identifier for child spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<SpanId>,
}

/// Producer identity recorded on every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    /// Architectural layer that produced the record (`gateway`, `policy`, ...).
    pub layer: Token,
    /// Component name within the layer.
    pub component: Token,
}

// ============================================================================
// SECTION: Content Reference
// ============================================================================

/// Content-addressed reference to a payload stored outside the envelope.
///
/// # Invariants
/// - `sha256` is the digest of the referenced payload, not of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    /// MIME content type of the referenced payload.
    pub content_type: Token,
    /// SHA-256 digest of the referenced payload.
    pub sha256: HexDigest,
    /// Size of the referenced payload in bytes.
    pub size_bytes: u64,
}

// ============================================================================
// SECTION: Record Kind
// ============================================================================

/// The closed set of record kinds a caller may declare when submitting to
/// the commit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Authenticated principal, credentials, grants. Chain root.
    AuthContext,
    /// Allow/deny with policy identity and reason codes.
    PolicyDecision,
    /// Evidence of a model invocation.
    ModelCall,
    /// Evidence of a tool invocation.
    ToolCall,
}

impl RecordKind {
    /// Parses a `record_type` string into the closed set of kinds.
    #[must_use]
    pub fn from_record_type(value: &str) -> Option<Self> {
        match value {
            "auth_context" => Some(Self::AuthContext),
            "policy_decision" => Some(Self::PolicyDecision),
            "model_call" => Some(Self::ModelCall),
            "tool_call" => Some(Self::ToolCall),
            _ => None,
        }
    }

    /// Returns the wire `record_type` string for this kind.
    #[must_use]
    pub const fn as_record_type(self) -> &'static str {
        match self {
            Self::AuthContext => "auth_context",
            Self::PolicyDecision => "policy_decision",
            Self::ModelCall => "model_call",
            Self::ToolCall => "tool_call",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_record_type())
    }
}

/// Free-form span kind constant helpers, kept as [`Token`] rather than an
/// enum because the specification does not close this set.
pub mod span_kind_values {
    /// The conventional root span kind for an `auth_context` record.
    pub const ROOT: &str = "root";
    /// The conventional child span kind for downstream records.
    pub const CHILD: &str = "child";
}

/// Re-exported for callers that want a typed handle on span kind strings
/// without reaching into [`span_kind_values`] directly.
pub type SpanKind = Token;

// ============================================================================
// SECTION: Record Sum Type
// ============================================================================

/// The tagged union of the four commit-able record kinds.
///
/// `record_type` is the serde-internal tag, so it appears exactly once per
/// value and is guaranteed, by construction, to match the kind-specific
/// shape (§3's "`record_type` appears exactly once and matches the
/// kind-specific schema" invariant holds for free once deserialization
/// succeeds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record_type", rename_all = "snake_case")]
pub enum Record {
    /// `auth_context` record.
    AuthContext(AuthContextRecord),
    /// `policy_decision` record.
    PolicyDecision(PolicyDecisionRecord),
    /// `model_call` record.
    ModelCall(ModelCallRecord),
    /// `tool_call` record.
    ToolCall(ToolCallRecord),
}

impl Record {
    /// Returns this record's kind.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::AuthContext(_) => RecordKind::AuthContext,
            Self::PolicyDecision(_) => RecordKind::PolicyDecision,
            Self::ModelCall(_) => RecordKind::ModelCall,
            Self::ToolCall(_) => RecordKind::ToolCall,
        }
    }

    /// Returns this record's trace context.
    #[must_use]
    pub fn trace(&self) -> &TraceContext {
        match self {
            Self::AuthContext(record) => &record.trace,
            Self::PolicyDecision(record) => &record.trace,
            Self::ModelCall(record) => &record.common().trace,
            Self::ToolCall(record) => &record.common().trace,
        }
    }

    /// Returns this record's declared `spec_version`.
    #[must_use]
    pub fn spec_version(&self) -> &str {
        match self {
            Self::AuthContext(record) => &record.spec_version,
            Self::PolicyDecision(record) => &record.spec_version,
            Self::ModelCall(record) => &record.common().spec_version,
            Self::ToolCall(record) => &record.common().spec_version,
        }
    }

    /// Returns this record's declared `canon_version`.
    #[must_use]
    pub fn canon_version(&self) -> &str {
        match self {
            Self::AuthContext(record) => &record.canon_version,
            Self::PolicyDecision(record) => &record.canon_version,
            Self::ModelCall(record) => &record.common().canon_version,
            Self::ToolCall(record) => &record.common().canon_version,
        }
    }
}
