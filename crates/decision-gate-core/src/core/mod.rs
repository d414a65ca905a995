// decision-gate-core/src/core/mod.rs
// ============================================================================
// Module: Decision Gate Core Types
// Description: Canonical record types, identifiers, codec, and failure taxonomy.
// Purpose: Provide stable, serializable types that define what "evidence" means.
// Dependencies: serde, serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Core types define the closed set of five record kinds, their shared trace
//! context, the canonical codec that gives every record its content-addressed
//! identity, and the closed taxonomy of commit and replay outcomes. These
//! types are the canonical source of truth for the gate and replay engines.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod auth_context;
pub mod evidence_call;
pub mod hashing;
pub mod identifiers;
pub mod policy_decision;
pub mod record;
pub mod string_set;
pub mod taxonomy;
pub mod time;
pub mod variance_policy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth_context::ActorRef;
pub use auth_context::AuthContextRecord;
pub use auth_context::CredentialRef;
pub use evidence_call::EvidenceCall;
pub use evidence_call::EvidenceCommon;
pub use evidence_call::ModelCallRecord;
pub use evidence_call::ModelRef;
pub use evidence_call::OutcomeRef;
pub use evidence_call::ToolCallRecord;
pub use evidence_call::ToolRef;
pub use evidence_call::UsageRef;
pub use hashing::CodecError;
pub use hashing::canonical_json_bytes;
pub use hashing::decode_record_value;
pub use hashing::hash_bytes;
pub use hashing::hash_canonical_json;
pub use identifiers::EnvelopeHash;
pub use identifiers::HexDigest;
pub use identifiers::Resource;
pub use identifiers::SpanId;
pub use identifiers::Token;
pub use identifiers::TraceId;
pub use policy_decision::DecisionOutcome;
pub use policy_decision::DecisionResult;
pub use policy_decision::PolicyDecisionRecord;
pub use policy_decision::PolicyRef;
pub use policy_decision::RequestRef;
pub use record::ContentRef;
pub use record::Producer;
pub use record::Record;
pub use record::RecordKind;
pub use record::SpanKind;
pub use record::TraceContext;
pub use record::CANON_VERSION;
pub use record::SPEC_VERSION;
pub use string_set::StringSet;
pub use taxonomy::ErrorKind;
pub use taxonomy::FailureClass;
pub use time::Clock;
pub use time::FixedClock;
pub use time::SystemClock;
pub use variance_policy::VariancePolicy;
