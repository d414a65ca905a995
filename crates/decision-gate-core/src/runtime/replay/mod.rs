// decision-gate-core/src/runtime/replay/mod.rs
// ============================================================================
// Module: Decision Gate Replay Engines
// Description: The three replay engines (invariant, forensic, constrained)
//              and the result shape they all emit.
// Purpose: Re-verify stored evidence without re-executing a model or tool,
//          at three progressively stricter levels (§4.7-§4.9).
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Invariant replay re-verifies integrity and governance invariants.
//! Forensic replay does everything invariant replay does, plus a byte-exact
//! canonical-bytes comparison (§8 property 7: passing forensic implies
//! passing invariant). Constrained replay compares a baseline trace against
//! a candidate trace under an explicit [`crate::core::VariancePolicy`],
//! tolerating only the response-reference differences both the record and
//! the policy approve.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod constrained;
pub mod forensic;
pub mod invariant;
pub mod result;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use constrained::ConstrainedReplayEngine;
pub use forensic::ForensicReplayEngine;
pub use invariant::InvariantReplayEngine;
pub use result::EmitError;
pub use result::ReplayResultRecord;
pub use result::ReplayType;
pub use result::ReplayVerdict;

use crate::core::EnvelopeHash;

/// The content-addressed handle to a replay run: its stored hash alongside
/// the result record itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// Content-addressed hash of the stored [`ReplayResultRecord`].
    pub hash: EnvelopeHash,
    /// The replay result record.
    pub record: ReplayResultRecord,
}
