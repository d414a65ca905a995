// decision-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: Decision Gate SQLite Artifact Store
// Description: `ArtifactStore` over a SQLite connection, one table per
//              namespace.
// Purpose: Durable, content-addressed storage with the same idempotent-put
//          semantics as the in-memory reference store.
// Dependencies: decision-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! Each namespace is one table keyed by envelope hash `TEXT PRIMARY KEY`,
//! storing the record's canonical JSON bytes and enough denormalized columns
//! (`trace_id`, `kind`) to support the lookups `ArtifactStore` requires
//! without deserializing every row. `INSERT OR IGNORE` gives the same
//! idempotent-by-hash put semantics as [`decision_gate_core::InMemoryArtifactStore`].

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use thiserror::Error;

use decision_gate_core::ArtifactStore;
use decision_gate_core::EnvelopeHash;
use decision_gate_core::ErrorKind;
use decision_gate_core::FailureClass;
use decision_gate_core::Record;
use decision_gate_core::RecordKind;
use decision_gate_core::RejectedAttempt;
use decision_gate_core::StoreError;
use decision_gate_core::StoredArtifact;
use decision_gate_core::StoredReplayResult;
use decision_gate_core::TraceId;
use decision_gate_core::runtime::replay::ReplayResultRecord;

const SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_meta (version INTEGER NOT NULL);
CREATE TABLE IF NOT EXISTS accepted (
    hash TEXT PRIMARY KEY,
    trace_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    canonical_bytes BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS accepted_trace_id ON accepted (trace_id);
CREATE TABLE IF NOT EXISTS rejected (
    hash TEXT PRIMARY KEY,
    trace_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    canonical_bytes BLOB NOT NULL,
    failure_class TEXT NOT NULL,
    error_kind TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS rejected_trace_id ON rejected (trace_id);
CREATE TABLE IF NOT EXISTS replay_results (
    hash TEXT PRIMARY KEY,
    canonical_bytes BLOB NOT NULL
);
";

/// Errors raised while opening or migrating a SQLite-backed artifact store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The underlying SQLite connection failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable `ArtifactStore` backed by a SQLite connection.
///
/// `rusqlite::Connection` is not `Sync`, so the connection is guarded by one
/// mutex shared across all three namespaces; callers needing more
/// concurrency than that should prefer [`decision_gate_core::InMemoryArtifactStore`]
/// for the hot path and periodically fold it into this store.
#[derive(Clone)]
pub struct SqliteArtifactStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteArtifactStore {
    /// Opens (creating if absent) a SQLite-backed artifact store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the connection cannot be opened or
    /// migrated.
    pub fn open(path: &Path) -> Result<Self, SqliteStoreError> {
        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory SQLite-backed store, for tests and demos.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the connection cannot be opened or
    /// migrated.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), SqliteStoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        let version: Option<i64> = conn
            .query_row("SELECT version FROM schema_meta LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        if version.is_none() {
            conn.execute(
                "INSERT INTO schema_meta (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        }
        Ok(())
    }
}

fn io_error(source: rusqlite::Error) -> StoreError {
    StoreError::Io(source.to_string())
}

fn poisoned() -> StoreError {
    StoreError::Poisoned("sqlite connection mutex poisoned".to_string())
}

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    conn.lock().map_err(|_| poisoned())
}

fn decode_kind(text: &str) -> Result<RecordKind, StoreError> {
    RecordKind::from_record_type(text)
        .ok_or_else(|| StoreError::Io(format!("unknown stored record kind {text:?}")))
}

fn decode_record(bytes: &[u8]) -> Result<Record, StoreError> {
    serde_json::from_slice(bytes).map_err(|err| StoreError::Io(err.to_string()))
}

fn decode_failure_class(text: &str) -> Result<FailureClass, StoreError> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|err| StoreError::Io(err.to_string()))
}

fn decode_error_kind(text: &str) -> Result<ErrorKind, StoreError> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|err| StoreError::Io(err.to_string()))
}

fn encode_failure_class(class: FailureClass) -> Result<String, StoreError> {
    match serde_json::to_value(class).map_err(|err| StoreError::Io(err.to_string()))? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(StoreError::Io(format!("unexpected failure_class encoding {other}"))),
    }
}

fn encode_error_kind(kind: &ErrorKind) -> Result<String, StoreError> {
    match serde_json::to_value(kind).map_err(|err| StoreError::Io(err.to_string()))? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(StoreError::Io(format!("unexpected error_kind encoding {other}"))),
    }
}

impl ArtifactStore for SqliteArtifactStore {
    fn get_accepted(&self, hash: &EnvelopeHash) -> Result<Option<StoredArtifact>, StoreError> {
        let conn = lock(&self.conn)?;
        let row: Option<(String, Vec<u8>)> = conn
            .query_row(
                "SELECT kind, canonical_bytes FROM accepted WHERE hash = ?1",
                params![hash.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(io_error)?;
        let Some((kind_text, canonical_bytes)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredArtifact {
            hash: hash.clone(),
            kind: decode_kind(&kind_text)?,
            record: decode_record(&canonical_bytes)?,
            canonical_bytes,
        }))
    }

    fn put_accepted(&self, artifact: StoredArtifact) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO accepted (hash, trace_id, kind, canonical_bytes) VALUES (?1, ?2, ?3, ?4)",
            params![
                artifact.hash.as_str(),
                artifact.record.trace().trace_id.as_str(),
                artifact.kind.as_record_type(),
                artifact.canonical_bytes,
            ],
        )
        .map_err(io_error)?;
        Ok(())
    }

    fn accepted_by_trace(&self, trace_id: &TraceId) -> Result<Vec<StoredArtifact>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare("SELECT hash, kind, canonical_bytes FROM accepted WHERE trace_id = ?1")
            .map_err(io_error)?;
        let rows = stmt
            .query_map(params![trace_id.as_str()], |row| {
                let hash: String = row.get(0)?;
                let kind: String = row.get(1)?;
                let bytes: Vec<u8> = row.get(2)?;
                Ok((hash, kind, bytes))
            })
            .map_err(io_error)?;
        let mut out = Vec::new();
        for row in rows {
            let (hash, kind, bytes) = row.map_err(io_error)?;
            out.push(StoredArtifact {
                hash: EnvelopeHash::parse(hash)
                    .map_err(|err| StoreError::Io(err.to_string()))?,
                kind: decode_kind(&kind)?,
                record: decode_record(&bytes)?,
                canonical_bytes: bytes,
            });
        }
        Ok(out)
    }

    fn get_rejected(&self, hash: &EnvelopeHash) -> Result<Option<RejectedAttempt>, StoreError> {
        let conn = lock(&self.conn)?;
        let row: Option<(String, Vec<u8>, String, String)> = conn
            .query_row(
                "SELECT kind, canonical_bytes, failure_class, error_kind FROM rejected WHERE hash = ?1",
                params![hash.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(io_error)?;
        let Some((kind_text, canonical_bytes, failure_class, error_kind)) = row else {
            return Ok(None);
        };
        Ok(Some(RejectedAttempt {
            hash: hash.clone(),
            kind: decode_kind(&kind_text)?,
            record: decode_record(&canonical_bytes)?,
            canonical_bytes,
            failure_class: decode_failure_class(&failure_class)?,
            error_kind: decode_error_kind(&error_kind)?,
        }))
    }

    fn put_rejected(&self, attempt: RejectedAttempt) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO rejected (hash, trace_id, kind, canonical_bytes, failure_class, error_kind) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                attempt.hash.as_str(),
                attempt.record.trace().trace_id.as_str(),
                attempt.kind.as_record_type(),
                attempt.canonical_bytes,
                encode_failure_class(attempt.failure_class)?,
                encode_error_kind(&attempt.error_kind)?,
            ],
        )
        .map_err(io_error)?;
        Ok(())
    }

    fn rejected_by_trace(&self, trace_id: &TraceId) -> Result<Vec<RejectedAttempt>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT hash, kind, canonical_bytes, failure_class, error_kind FROM rejected WHERE trace_id = ?1",
            )
            .map_err(io_error)?;
        let rows = stmt
            .query_map(params![trace_id.as_str()], |row| {
                let hash: String = row.get(0)?;
                let kind: String = row.get(1)?;
                let bytes: Vec<u8> = row.get(2)?;
                let failure_class: String = row.get(3)?;
                let error_kind: String = row.get(4)?;
                Ok((hash, kind, bytes, failure_class, error_kind))
            })
            .map_err(io_error)?;
        let mut out = Vec::new();
        for row in rows {
            let (hash, kind, bytes, failure_class, error_kind) = row.map_err(io_error)?;
            out.push(RejectedAttempt {
                hash: EnvelopeHash::parse(hash)
                    .map_err(|err| StoreError::Io(err.to_string()))?,
                kind: decode_kind(&kind)?,
                record: decode_record(&bytes)?,
                canonical_bytes: bytes,
                failure_class: decode_failure_class(&failure_class)?,
                error_kind: decode_error_kind(&error_kind)?,
            });
        }
        Ok(out)
    }

    fn get_replay_result(
        &self,
        hash: &EnvelopeHash,
    ) -> Result<Option<StoredReplayResult>, StoreError> {
        let conn = lock(&self.conn)?;
        let bytes: Option<Vec<u8>> = conn
            .query_row(
                "SELECT canonical_bytes FROM replay_results WHERE hash = ?1",
                params![hash.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(io_error)?;
        let Some(bytes) = bytes else {
            return Ok(None);
        };
        let result: ReplayResultRecord =
            serde_json::from_slice(&bytes).map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(Some(StoredReplayResult {
            hash: hash.clone(),
            canonical_bytes: bytes,
            result,
        }))
    }

    fn put_replay_result(&self, artifact: StoredReplayResult) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO replay_results (hash, canonical_bytes) VALUES (?1, ?2)",
            params![artifact.hash.as_str(), artifact.canonical_bytes],
        )
        .map_err(io_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decision_gate_core::CommitGate;
    use decision_gate_core::InMemoryArtifactStore;
    use std::sync::Arc as StdArc;

    fn sample_auth_context_json(trace_id: &str) -> serde_json::Value {
        serde_json::json!({
            "record_type": "auth_context",
            "spec_version": "1.0.0",
            "canon_version": "1",
            "trace": { "trace_id": trace_id, "span_id": "00f067aa0ba902b7", "span_kind": "root" },
            "producer": { "layer": "gateway", "component": "ingress" },
            "ts_ms": 1_769_817_600_000_u64,
            "actor": { "actor_kind": "human", "actor_id": "u1" },
            "credential": {
                "credential_kind": "oauth_token",
                "issuer": "idp",
                "presented_hash_sha256": "a".repeat(64),
                "verified_at_ms": 1,
                "expires_at_ms": 2
            },
            "grants": { "read": true }
        })
    }

    struct AlwaysAuthContext;

    impl decision_gate_core::SchemaValidator for AlwaysAuthContext {
        fn validate(
            &self,
            _value: &serde_json::Value,
        ) -> Result<RecordKind, decision_gate_core::SchemaError> {
            Ok(RecordKind::AuthContext)
        }
    }

    #[test]
    fn put_accepted_round_trips_through_sqlite() {
        let store = SqliteArtifactStore::open_in_memory().unwrap();
        let trace_id = "4bf92f3577b34da6a3ce929d0e0e4736";
        let value = sample_auth_context_json(trace_id);
        let canonical_bytes = decision_gate_core::canonical_json_bytes(&value).unwrap();
        let hash: EnvelopeHash = decision_gate_core::hash_bytes(&canonical_bytes).into();
        let record: Record = serde_json::from_value(value).unwrap();
        store
            .put_accepted(StoredArtifact {
                hash: hash.clone(),
                canonical_bytes,
                kind: RecordKind::AuthContext,
                record,
            })
            .unwrap();
        let fetched = store.get_accepted(&hash).unwrap().unwrap();
        assert_eq!(fetched.hash, hash);
        let by_trace = store
            .accepted_by_trace(&TraceId::parse(trace_id).unwrap())
            .unwrap();
        assert_eq!(by_trace.len(), 1);
    }

    #[test]
    fn put_accepted_is_idempotent() {
        let store = SqliteArtifactStore::open_in_memory().unwrap();
        let value = sample_auth_context_json("4bf92f3577b34da6a3ce929d0e0e4736");
        let canonical_bytes = decision_gate_core::canonical_json_bytes(&value).unwrap();
        let hash: EnvelopeHash = decision_gate_core::hash_bytes(&canonical_bytes).into();
        let record: Record = serde_json::from_value(value).unwrap();
        for _ in 0..2 {
            store
                .put_accepted(StoredArtifact {
                    hash: hash.clone(),
                    canonical_bytes: canonical_bytes.clone(),
                    kind: RecordKind::AuthContext,
                    record: record.clone(),
                })
                .unwrap();
        }
        let by_trace = store
            .accepted_by_trace(&TraceId::parse("4bf92f3577b34da6a3ce929d0e0e4736").unwrap())
            .unwrap();
        assert_eq!(by_trace.len(), 1);
    }

    #[test]
    fn commit_gate_accepts_into_sqlite_store() {
        let sqlite_store = SqliteArtifactStore::open_in_memory().unwrap();
        let store: StdArc<dyn ArtifactStore + Send + Sync> = StdArc::new(sqlite_store);
        let gate = CommitGate::new(store, StdArc::new(AlwaysAuthContext));
        let value = sample_auth_context_json("4bf92f3577b34da6a3ce929d0e0e4736");
        let canonical_bytes = decision_gate_core::canonical_json_bytes(&value).unwrap();
        let hash: EnvelopeHash = decision_gate_core::hash_bytes(&canonical_bytes).into();
        let outcome = gate.commit("auth_context", &hash, &value).unwrap();
        assert!(outcome.accepted);
        // proves InMemoryArtifactStore is not the only backend the gate can drive.
        let _ = InMemoryArtifactStore::new();
    }
}
