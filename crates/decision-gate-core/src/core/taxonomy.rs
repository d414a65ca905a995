// decision-gate-core/src/core/taxonomy.rs
// ============================================================================
// Module: Decision Gate Failure Taxonomy
// Description: The closed set of commit and replay outcome classifications.
// Purpose: Give every accept/reject/drop and every replay failure a single
//          stable classification and a stable, testable error-kind string.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Outcomes are data, not exceptions. Every classification below is part of
//! the external contract: test vectors assert against the exact strings
//! returned by [`ErrorKind`], so renaming a variant's rendered form is a
//! breaking change even if the Rust identifier stays the same.

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

/// Closed set of commit and replay outcome classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureClass {
    /// All commit-gate checks passed; the record was stored as accepted.
    Accept,
    /// Schema validation failed, canonicalization failed, or the declared
    /// `record_type` disagreed with the payload. Not persisted.
    SchemaReject,
    /// The declared envelope hash did not match the computed hash. Stored as
    /// a rejected attempt keyed by the computed hash.
    HashMismatch,
    /// A required referenced artifact was absent from the accepted store.
    MissingPrereq,
    /// This record's `trace_id` disagreed with a resolved prerequisite's.
    TraceViolation,
    /// The resolved policy decision's result was not `allow`.
    UnauthorizedExecution,
    /// The declared record kind fell outside the closed set of five.
    /// Not persisted.
    RecordTypeForbidden,
    /// Invariant or forensic replay could not locate any accepted chain for
    /// the requested trace.
    ReplayChainNotFound,
    /// Constrained replay found the baseline and candidate traces took
    /// different policy paths.
    ReplayPolicyPathMismatch,
    /// Constrained replay found an unapproved difference between matched
    /// evidence records.
    ReplayVarianceViolation,
}

// ============================================================================
// SECTION: Error Kind Strings
// ============================================================================

/// A stable, dot-separated error-kind string, e.g. `missing_prereq.auth_context`.
///
/// Error kinds are part of the external contract (§7): callers and test
/// vectors match on the exact rendered string, never on the [`FailureClass`]
/// alone, because several kinds can share one class (both
/// `missing_prereq.auth_context` and `missing_prereq.policy_decision` are
/// [`FailureClass::MissingPrereq`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorKind(String);

impl ErrorKind {
    fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the rendered error-kind string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    // -- schema_violation.* -------------------------------------------------

    /// `schema_violation.required.<field>`
    #[must_use]
    pub fn schema_required(field: &str) -> Self {
        Self::new(format!("schema_violation.required.{field}"))
    }

    /// `schema_violation.additional_properties`
    #[must_use]
    pub fn schema_additional_properties() -> Self {
        Self::new("schema_violation.additional_properties")
    }

    /// `schema_violation.pattern`
    #[must_use]
    pub fn schema_pattern() -> Self {
        Self::new("schema_violation.pattern")
    }

    /// `schema_violation.enum`
    #[must_use]
    pub fn schema_enum() -> Self {
        Self::new("schema_violation.enum")
    }

    /// `schema_violation.type`
    #[must_use]
    pub fn schema_type() -> Self {
        Self::new("schema_violation.type")
    }

    /// `schema_violation.trace_context.missing_trace_id`
    #[must_use]
    pub fn schema_missing_trace_id() -> Self {
        Self::new("schema_violation.trace_context.missing_trace_id")
    }

    /// `schema_violation.canonicalization`
    #[must_use]
    pub fn schema_canonicalization() -> Self {
        Self::new("schema_violation.canonicalization")
    }

    /// `schema_violation.record_type_mismatch`
    #[must_use]
    pub fn schema_record_type_mismatch() -> Self {
        Self::new("schema_violation.record_type_mismatch")
    }

    /// `record_type_forbidden`
    #[must_use]
    pub fn record_type_forbidden() -> Self {
        Self::new("record_type_forbidden")
    }

    // -- hash_mismatch.* ------------------------------------------------------

    /// `hash_mismatch.envelope_hash`
    #[must_use]
    pub fn hash_mismatch_envelope() -> Self {
        Self::new("hash_mismatch.envelope_hash")
    }

    /// `hash_mismatch.canonical_json_mismatch`
    #[must_use]
    pub fn hash_mismatch_canonical_json() -> Self {
        Self::new("hash_mismatch.canonical_json_mismatch")
    }

    // -- missing_prereq.* -----------------------------------------------------

    /// `missing_prereq.auth_context`
    #[must_use]
    pub fn missing_prereq_auth_context() -> Self {
        Self::new("missing_prereq.auth_context")
    }

    /// `missing_prereq.policy_decision`
    #[must_use]
    pub fn missing_prereq_policy_decision() -> Self {
        Self::new("missing_prereq.policy_decision")
    }

    // -- trace_violation.* ----------------------------------------------------

    /// `trace_violation.trace_id_mismatch`
    #[must_use]
    pub fn trace_violation_mismatch() -> Self {
        Self::new("trace_violation.trace_id_mismatch")
    }

    // -- unauthorized.* -------------------------------------------------------

    /// `unauthorized.policy_denied`
    #[must_use]
    pub fn unauthorized_policy_denied() -> Self {
        Self::new("unauthorized.policy_denied")
    }

    // -- replay.* ---------------------------------------------------------

    /// `replay.chain_not_found`
    #[must_use]
    pub fn replay_chain_not_found() -> Self {
        Self::new("replay.chain_not_found")
    }

    /// `replay.policy_path_mismatch`
    #[must_use]
    pub fn replay_policy_path_mismatch() -> Self {
        Self::new("replay.policy_path_mismatch")
    }

    /// `replay.variance_violation`
    #[must_use]
    pub fn replay_variance_violation() -> Self {
        Self::new("replay.variance_violation")
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_strings_are_stable() {
        assert_eq!(
            ErrorKind::missing_prereq_auth_context().as_str(),
            "missing_prereq.auth_context"
        );
        assert_eq!(
            ErrorKind::trace_violation_mismatch().as_str(),
            "trace_violation.trace_id_mismatch"
        );
        assert_eq!(
            ErrorKind::unauthorized_policy_denied().as_str(),
            "unauthorized.policy_denied"
        );
        assert_eq!(
            ErrorKind::hash_mismatch_envelope().as_str(),
            "hash_mismatch.envelope_hash"
        );
        assert_eq!(
            ErrorKind::schema_additional_properties().as_str(),
            "schema_violation.additional_properties"
        );
    }
}
