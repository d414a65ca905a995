// decision-gate-cli/src/main.rs
// ============================================================================
// Module: Decision Gate CLI Entry Point
// Description: Command dispatcher for `commit` and `replay` over the
//              evidence ledger core (component 16).
// Purpose: Give operators a thin, scriptable surface over the commit gate
//          and replay engines without embedding any governance logic here.
// Dependencies: clap, decision-gate-config, decision-gate-contract,
//               decision-gate-core, decision-gate-store-sqlite, serde_json
// ============================================================================

//! ## Overview
//! Every subcommand wires the same three pieces — an
//! [`decision_gate_core::ArtifactStore`], a
//! [`decision_gate_contract::JsonSchemaValidator`], and where relevant a
//! [`decision_gate_core::VariancePolicy`] — and prints the resulting outcome
//! as JSON on stdout. This binary holds no evidence semantics of its own.

use std::fs;
use std::io::Read as _;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use thiserror::Error;

use decision_gate_config::CanonConfig;
use decision_gate_config::load_canon_config;
use decision_gate_contract::JsonSchemaValidator;
use decision_gate_core::ArtifactStore;
use decision_gate_core::CommitGate;
use decision_gate_core::ConstrainedReplayEngine;
use decision_gate_core::EnvelopeHash;
use decision_gate_core::ForensicReplayEngine;
use decision_gate_core::InMemoryArtifactStore;
use decision_gate_core::InvariantReplayEngine;
use decision_gate_core::SystemClock;
use decision_gate_core::TraceId;
use decision_gate_core::VariancePolicy;
use decision_gate_store_sqlite::SqliteArtifactStore;

/// Operator CLI over the Decision Gate evidence ledger.
#[derive(Debug, Parser)]
#[command(name = "decision-gate", version, about)]
struct Cli {
    /// Optional canon configuration file pinning spec/canon version and the
    /// default variance policy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path to a SQLite-backed store. Defaults to an empty in-memory store
    /// that does not survive this process.
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submits a record to the commit gate.
    Commit(CommitArgs),
    /// Re-verifies a stored trace.
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
struct CommitArgs {
    /// Path to the JSON record to submit. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Declared `record_type`. Read from the record body when omitted.
    #[arg(long)]
    kind: Option<String>,
    /// Declared envelope hash (SHA-256 hex of the canonical form). Computed
    /// from the record body when omitted.
    #[arg(long)]
    hash: Option<String>,
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Which replay engine to run.
    #[arg(long, value_enum)]
    engine: ReplayEngine,
    /// Trace to replay (the baseline trace, for constrained replay).
    #[arg(long)]
    trace: String,
    /// Candidate trace, required for constrained replay.
    #[arg(long)]
    candidate: Option<String>,
    /// Use the permissive variance policy instead of the configured default.
    #[arg(long)]
    permissive: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ReplayEngine {
    Invariant,
    Forensic,
    Constrained,
}

/// CLI-level errors, all terminal: each maps to a distinct process exit.
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("input was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidArg(String),
    #[error("config error: {0}")]
    Config(#[from] decision_gate_config::ConfigError),
    #[error("schema registry error: {0}")]
    Registry(#[from] decision_gate_contract::RegistryError),
    #[error("sqlite store error: {0}")]
    SqliteStore(#[from] decision_gate_store_sqlite::SqliteStoreError),
    #[error("store error: {0}")]
    Store(#[from] decision_gate_core::StoreError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint_error(&err);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stderr, reason = "CLI error reporting is a user-facing surface, not library logging")]
fn eprint_error(err: &CliError) {
    eprintln!("decision-gate: {err}");
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli
        .config
        .as_deref()
        .map(load_canon_config)
        .transpose()?
        .unwrap_or(CanonConfig {
            spec_version: decision_gate_core::SPEC_VERSION.to_string(),
            canon_version: decision_gate_core::CANON_VERSION.to_string(),
            default_variance_policy: VariancePolicy::strict(),
        });

    let store = open_store(cli.store.as_deref())?;

    match cli.command {
        Command::Commit(args) => run_commit(&store, args),
        Command::Replay(args) => run_replay(&store, &config, args),
    }
}

fn open_store(path: Option<&Path>) -> Result<Arc<dyn ArtifactStore + Send + Sync>, CliError> {
    match path {
        Some(path) => Ok(Arc::new(SqliteArtifactStore::open(path)?)),
        None => Ok(Arc::new(InMemoryArtifactStore::new())),
    }
}

fn read_record_value(input: Option<&Path>) -> Result<Value, CliError> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&text)?)
}

fn run_commit(store: &Arc<dyn ArtifactStore + Send + Sync>, args: CommitArgs) -> Result<(), CliError> {
    let value = read_record_value(args.input.as_deref())?;

    let kind = match args.kind {
        Some(kind) => kind,
        None => value
            .get("record_type")
            .and_then(Value::as_str)
            .ok_or_else(|| CliError::InvalidArg("record has no record_type and --kind was not given".to_string()))?
            .to_string(),
    };

    let declared_hash = match args.hash {
        Some(hash) => EnvelopeHash::parse(hash)
            .map_err(|err| CliError::InvalidArg(err.to_string()))?,
        None => {
            let canonical_bytes = decision_gate_core::canonical_json_bytes(&value)
                .map_err(|err| CliError::InvalidArg(err.to_string()))?;
            decision_gate_core::hash_bytes(&canonical_bytes).into()
        }
    };

    let validator = Arc::new(JsonSchemaValidator::new()?);
    let gate = CommitGate::new(store.clone(), validator);
    let outcome = gate.commit(&kind, &declared_hash, &value)?;
    print_json(&outcome_to_json(&outcome));
    Ok(())
}

fn run_replay(
    store: &Arc<dyn ArtifactStore + Send + Sync>,
    config: &CanonConfig,
    args: ReplayArgs,
) -> Result<(), CliError> {
    let validator = Arc::new(JsonSchemaValidator::new()?);
    let clock = Arc::new(SystemClock);
    let trace_id =
        TraceId::parse(args.trace).map_err(|err| CliError::InvalidArg(err.to_string()))?;

    let outcome = match args.engine {
        ReplayEngine::Invariant => {
            let engine = InvariantReplayEngine::new(store.clone(), validator, clock);
            engine.replay(&trace_id)?
        }
        ReplayEngine::Forensic => {
            let engine = ForensicReplayEngine::new(store.clone(), validator, clock);
            engine.replay(&trace_id)?
        }
        ReplayEngine::Constrained => {
            let candidate = args
                .candidate
                .ok_or_else(|| CliError::InvalidArg("constrained replay requires --candidate".to_string()))?;
            let candidate_id =
                TraceId::parse(candidate).map_err(|err| CliError::InvalidArg(err.to_string()))?;
            let policy = if args.permissive {
                VariancePolicy::permissive()
            } else {
                config.variance_policy()
            };
            let engine = ConstrainedReplayEngine::new(store.clone(), validator, clock);
            engine.replay(&trace_id, &candidate_id, &policy)?
        }
    };

    print_json(&serde_json::to_value(&outcome.record).unwrap_or(Value::Null));
    Ok(())
}

fn outcome_to_json(outcome: &decision_gate_core::CommitOutcome) -> Value {
    serde_json::json!({
        "accepted": outcome.accepted,
        "classification": outcome.classification,
        "error_kind": outcome.error_kind,
        "computed_envelope_hash": outcome.computed_envelope_hash,
    })
}

#[allow(clippy::print_stdout, reason = "the CLI's stable output contract is stdout JSON, not a library logging path")]
fn print_json(value: &Value) {
    println!("{value}");
}
