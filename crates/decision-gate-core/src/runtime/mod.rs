// decision-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Decision Gate Runtime
// Description: The commit gate, artifact store, trace index, and replay
//              engines that operate over the core record types.
// Purpose: House every stateful operation the system performs: accepting
//          evidence, indexing it per trace, and re-verifying it later.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime is split into four concerns that compose through the
//! [`crate::interfaces::ArtifactStore`] trait rather than through direct
//! coupling: the gate writes, the trace index reads deterministically, and
//! the replay engines read and re-verify. [`InMemoryArtifactStore`] is the
//! reference implementation used by all of them in tests and single-process
//! deployments.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gate;
pub mod replay;
pub mod store;
pub mod trace_index;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::CommitGate;
pub use gate::CommitOutcome;
pub use replay::ConstrainedReplayEngine;
pub use replay::ForensicReplayEngine;
pub use replay::InvariantReplayEngine;
pub use replay::ReplayOutcome;
pub use store::InMemoryArtifactStore;
pub use trace_index::ChainEntry;
pub use trace_index::TraceChain;
pub use trace_index::TraceIndex;
