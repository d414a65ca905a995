// decision-gate-core/src/core/auth_context.rs
// ============================================================================
// Module: Decision Gate Auth Context Record
// Description: The chain-root record: authenticated principal, credentials,
//              and grants.
// Purpose: Model the `auth_context` record kind with no cross-references.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every evidence chain is rooted in an `auth_context`. It carries no
//! prerequisite hash of its own (§3's "Required cross-refs: none") and is the
//! only record kind the commit gate can accept without consulting the store.

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::HexDigest;
use crate::core::identifiers::Token;
use crate::core::record::Producer;
use crate::core::record::TraceContext;
use crate::core::string_set::StringSet;

/// Authenticated actor identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    /// Actor kind (`human`, `service`, `agent`, ...).
    pub actor_kind: Token,
    /// Actor identifier, stable within its kind.
    pub actor_id: Token,
}

/// Credential evidence backing the authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    /// Credential kind (`oauth_token`, `mtls_cert`, `api_key`, ...).
    pub credential_kind: Token,
    /// Issuer of the credential.
    pub issuer: Token,
    /// SHA-256 of the presented credential material (never the material
    /// itself).
    pub presented_hash_sha256: HexDigest,
    /// Epoch millisecond timestamp at which the credential was verified.
    pub verified_at_ms: u64,
    /// Epoch millisecond timestamp at which the credential expires.
    pub expires_at_ms: u64,
}

/// `auth_context` record: authenticated principal, credentials, grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContextRecord {
    /// Fixed spec version for this canon revision.
    pub spec_version: String,
    /// Fixed canon version for this canon revision.
    pub canon_version: String,
    /// Trace context shared by every record kind.
    pub trace: TraceContext,
    /// Producer identity.
    pub producer: Producer,
    /// Epoch millisecond timestamp of authentication.
    pub ts_ms: u64,
    /// Authenticated actor.
    pub actor: ActorRef,
    /// Credential evidence.
    pub credential: CredentialRef,
    /// Grants held by the actor.
    pub grants: StringSet,
}
