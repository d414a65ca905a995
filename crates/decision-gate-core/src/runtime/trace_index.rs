// decision-gate-core/src/runtime/trace_index.rs
// ============================================================================
// Module: Decision Gate Trace Index & Resolver
// Description: Deterministic per-trace view over the artifact store.
// Purpose: Order every stored artifact sharing a trace_id into one chain, so
//          replay engines see the same sequence regardless of insertion
//          order or how many times the index is rebuilt.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Insertion order into the store is an implementation choice (§5); the
//! trace index is the thing that makes ordering a pure function of the
//! stored content instead. [`TraceIndex::resolve`] re-derives the same chain
//! on every call for a fixed store (§8 property 8).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::Record;
use crate::core::TraceId;
use crate::interfaces::ArtifactStore;
use crate::interfaces::RejectedAttempt;
use crate::interfaces::StoreError;
use crate::interfaces::StoredArtifact;

// ============================================================================
// SECTION: Chain Entry
// ============================================================================

/// One artifact in an ordered trace chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainEntry {
    /// An accepted artifact.
    Accepted(StoredArtifact),
    /// A rejected-attempt artifact, only present when the resolver was asked
    /// to include them.
    Rejected(RejectedAttempt),
}

impl ChainEntry {
    /// Returns the record carried by this entry.
    #[must_use]
    pub fn record(&self) -> &Record {
        match self {
            Self::Accepted(artifact) => &artifact.record,
            Self::Rejected(attempt) => &attempt.record,
        }
    }

    /// Returns the envelope hash carried by this entry.
    #[must_use]
    pub fn hash(&self) -> &str {
        match self {
            Self::Accepted(artifact) => artifact.hash.as_str(),
            Self::Rejected(attempt) => attempt.hash.as_str(),
        }
    }
}

/// An ordered view of every stored artifact sharing one `trace_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceChain {
    /// The trace identifier this chain was resolved for.
    pub trace_id: TraceId,
    /// Chain entries in resolver order (§4.6).
    pub entries: Vec<ChainEntry>,
}

impl TraceChain {
    /// Returns the accepted artifacts in this chain, in order.
    pub fn accepted(&self) -> impl Iterator<Item = &StoredArtifact> {
        self.entries.iter().filter_map(|entry| match entry {
            ChainEntry::Accepted(artifact) => Some(artifact),
            ChainEntry::Rejected(_) => None,
        })
    }
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

/// Kind class ordering: `auth_context(0) < policy_decision(1) <
/// model_call/tool_call(2)`.
fn kind_class(record: &Record) -> u8 {
    match record {
        Record::AuthContext(_) => 0,
        Record::PolicyDecision(_) => 1,
        Record::ModelCall(_) | Record::ToolCall(_) => 2,
    }
}

/// The time key used for ordering within a kind class: `ts_ms` for
/// auth/policy records, `started_at_ms` for evidence records.
fn time_key(record: &Record) -> u64 {
    match record {
        Record::AuthContext(auth) => auth.ts_ms,
        Record::PolicyDecision(policy) => policy.ts_ms,
        Record::ModelCall(call) => call.common.started_at_ms,
        Record::ToolCall(call) => call.common.started_at_ms,
    }
}

fn sort_key(entry: &ChainEntry) -> (u8, u64, &str) {
    (kind_class(entry.record()), time_key(entry.record()), entry.hash())
}

// ============================================================================
// SECTION: Trace Index
// ============================================================================

/// Builds deterministic per-trace views over an artifact store.
#[derive(Clone)]
pub struct TraceIndex {
    store: Arc<dyn ArtifactStore + Send + Sync>,
}

impl TraceIndex {
    /// Builds a trace index over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ArtifactStore + Send + Sync>) -> Self {
        Self {
            store,
        }
    }

    /// Resolves the ordered chain for `trace_id`, or `None` if no artifact
    /// carries it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    pub fn resolve(
        &self,
        trace_id: &TraceId,
        include_rejected_attempts: bool,
    ) -> Result<Option<TraceChain>, StoreError> {
        let accepted = self.store.accepted_by_trace(trace_id)?;
        let rejected = if include_rejected_attempts {
            self.store.rejected_by_trace(trace_id)?
        } else {
            Vec::new()
        };

        if accepted.is_empty() && rejected.is_empty() {
            return Ok(None);
        }

        let mut entries: Vec<ChainEntry> = accepted
            .into_iter()
            .map(ChainEntry::Accepted)
            .chain(rejected.into_iter().map(ChainEntry::Rejected))
            .collect();
        entries.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        Ok(Some(TraceChain {
            trace_id: trace_id.clone(),
            entries,
        }))
    }
}
