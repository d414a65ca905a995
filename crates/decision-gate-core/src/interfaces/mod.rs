// decision-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Decision Gate Interfaces
// Description: Backend-agnostic interfaces for artifact storage and schema
//              validation.
// Purpose: Define the contract surfaces the commit gate and replay engines
//          hold as trait objects, so schema compilation and durable storage
//          can live outside this crate.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The gate and replay engines never construct a store or a schema registry
//! themselves; both arrive as trait objects. This keeps the closed-world JSON
//! Schemas (component 11) and any durable storage backend (component 15) out
//! of this crate entirely, matching this canon revision's "schema compilation
//! out of the core" decision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::EnvelopeHash;
use crate::core::ErrorKind;
use crate::core::FailureClass;
use crate::core::Record;
use crate::core::RecordKind;
use crate::core::TraceId;
use crate::runtime::replay::ReplayResultRecord;

// ============================================================================
// SECTION: Schema Validator
// ============================================================================

/// Schema validation errors: the stable `schema_violation.*` kind strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct SchemaError {
    /// Stable error-kind string, e.g. `schema_violation.additional_properties`.
    pub kind: ErrorKind,
}

impl SchemaError {
    /// Builds a schema error from an error kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

/// Closed-world structural validation for the four commit-able record kinds.
///
/// Implementations consume already-compiled schemas (component 11, the
/// Schema Registry) and report the first-error kind in schema order; the gate
/// never sees a schema document, only this trait.
pub trait SchemaValidator {
    /// Validates `value` against the schema selected by its own
    /// `record_type` field.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when `record_type` is unrecognized or absent,
    /// the value fails closed-world structural validation, or the trace
    /// context is missing its required fields.
    fn validate(&self, value: &Value) -> Result<RecordKind, SchemaError>;
}

// ============================================================================
// SECTION: Artifact Store
// ============================================================================

/// Artifact store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's internal lock was poisoned by a panicking holder.
    #[error("artifact store lock poisoned: {0}")]
    Poisoned(String),
    /// The store's backing I/O failed.
    #[error("artifact store io error: {0}")]
    Io(String),
    /// A hash already present in one namespace was submitted again with
    /// different content, which content-addressing forbids.
    #[error("artifact store hash collision at {hash}")]
    HashCollision {
        /// The colliding envelope hash.
        hash: EnvelopeHash,
    },
}

/// An accepted artifact: canonical bytes, kind, and record, keyed by its
/// envelope hash.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArtifact {
    /// Content-addressed identity of this artifact.
    pub hash: EnvelopeHash,
    /// Canonical JSON bytes the hash was computed over.
    pub canonical_bytes: Vec<u8>,
    /// Record kind.
    pub kind: RecordKind,
    /// The record itself.
    pub record: Record,
}

/// A rejected-attempt artifact: an artifact that passed schema validation but
/// failed a later commit-gate step.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedAttempt {
    /// Content-addressed identity of this artifact (the computed hash, not
    /// necessarily the hash the producer declared).
    pub hash: EnvelopeHash,
    /// Canonical JSON bytes the hash was computed over.
    pub canonical_bytes: Vec<u8>,
    /// Record kind.
    pub kind: RecordKind,
    /// The record itself.
    pub record: Record,
    /// The failure classification (never [`FailureClass::Accept`]).
    pub failure_class: FailureClass,
    /// The stable error-kind string for this failure.
    pub error_kind: ErrorKind,
}

/// A stored replay-result artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReplayResult {
    /// Content-addressed identity of this replay result.
    pub hash: EnvelopeHash,
    /// Canonical JSON bytes the hash was computed over.
    pub canonical_bytes: Vec<u8>,
    /// The replay result record itself.
    pub result: ReplayResultRecord,
}

/// Content-addressed storage for accepted records, rejected-attempt records,
/// and replay-result records.
///
/// No deletion, no update: the store is append-only by construction. Each
/// hash maps to at most one record across all three namespaces, because
/// content-addressing guarantees uniqueness.
pub trait ArtifactStore {
    /// Fetches an accepted artifact by envelope hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn get_accepted(&self, hash: &EnvelopeHash) -> Result<Option<StoredArtifact>, StoreError>;

    /// Persists an accepted artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written, or when
    /// `hash` is already present with different content.
    fn put_accepted(&self, artifact: StoredArtifact) -> Result<(), StoreError>;

    /// Lists every accepted artifact carrying the given `trace_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn accepted_by_trace(&self, trace_id: &TraceId) -> Result<Vec<StoredArtifact>, StoreError>;

    /// Fetches a rejected-attempt artifact by envelope hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn get_rejected(&self, hash: &EnvelopeHash) -> Result<Option<RejectedAttempt>, StoreError>;

    /// Persists a rejected-attempt artifact. Idempotent: the same hash
    /// submitted twice yields the same stored attempt.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn put_rejected(&self, attempt: RejectedAttempt) -> Result<(), StoreError>;

    /// Lists every rejected-attempt artifact carrying the given `trace_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn rejected_by_trace(&self, trace_id: &TraceId) -> Result<Vec<RejectedAttempt>, StoreError>;

    /// Fetches a replay-result artifact by its hash.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn get_replay_result(
        &self,
        hash: &EnvelopeHash,
    ) -> Result<Option<StoredReplayResult>, StoreError>;

    /// Persists a replay-result artifact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be written.
    fn put_replay_result(&self, artifact: StoredReplayResult) -> Result<(), StoreError>;
}
