// decision-gate-core/src/lib.rs
// ============================================================================
// Module: Decision Gate Core Library
// Description: Public API surface for the Decision Gate evidence ledger core.
// Purpose: Expose canonicalization, record types, the commit gate, and the
//          replay engines.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Decision Gate core records governance decisions about AI-assisted actions
//! as a tamper-evident, content-addressed evidence ledger. Every accepted
//! record is keyed by the SHA-256 of its canonical JSON form; a single commit
//! gate validates records against a closed-world contract before persisting
//! them, and a family of replay engines later verify, without executing
//! anything, that a stored trace still satisfies the invariants it did when
//! first accepted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::ArtifactStore;
pub use interfaces::RejectedAttempt;
pub use interfaces::SchemaValidator;
pub use interfaces::StoreError;
pub use interfaces::StoredArtifact;
pub use interfaces::StoredReplayResult;
pub use runtime::CommitGate;
pub use runtime::CommitOutcome;
pub use runtime::ConstrainedReplayEngine;
pub use runtime::ForensicReplayEngine;
pub use runtime::InMemoryArtifactStore;
pub use runtime::InvariantReplayEngine;
pub use runtime::ReplayOutcome;
pub use runtime::TraceChain;
pub use runtime::TraceIndex;
