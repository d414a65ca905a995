// decision-gate-core/src/core/variance_policy.rs
// ============================================================================
// Module: Decision Gate Variance Policy
// Description: The explicit policy constrained replay compares candidate
//              evidence against.
// Purpose: Give `constrained_replay`'s `policy` parameter (§6) a concrete
//          shape: a per-kind toggle layered over each evidence record's own
//          `allow_response_blobref` flag.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A response-reference difference between a baseline and candidate evidence
//! record is only tolerated when both the record itself opts in
//! (`allow_response_blobref`, §3) and the variance policy passed to
//! constrained replay permits that kind of variance at all. The second gate
//! is what lets an operator disable response variance fleet-wide (e.g. for a
//! compliance freeze) without having to re-author every record.

use serde::Deserialize;
use serde::Serialize;

/// Explicit policy `constrained_replay` compares candidate evidence against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariancePolicy {
    /// Whether `model_call` response-reference variance may be approved at
    /// all, subject to the record's own `allow_response_blobref`.
    pub allow_model_call_variance: bool,
    /// Whether `tool_call` response-reference variance may be approved at
    /// all, subject to the record's own `allow_response_blobref`.
    pub allow_tool_call_variance: bool,
}

impl VariancePolicy {
    /// The strictest policy: no response-reference variance of any kind,
    /// regardless of what individual records declare.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            allow_model_call_variance: false,
            allow_tool_call_variance: false,
        }
    }

    /// The most permissive policy: response-reference variance is allowed
    /// whenever the record itself opts in.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            allow_model_call_variance: true,
            allow_tool_call_variance: true,
        }
    }
}

impl Default for VariancePolicy {
    fn default() -> Self {
        Self::strict()
    }
}
