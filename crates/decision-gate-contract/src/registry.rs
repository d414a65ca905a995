// decision-gate-contract/src/registry.rs
// ============================================================================
// Module: Decision Gate Schema Registry
// Description: Compiles the four embedded schemas once and looks them up by
//              record kind.
// Purpose: Keep schema compilation (which can fail, and is not free) out of
//          the hot validation path.
// Dependencies: decision-gate-core, jsonschema
// ============================================================================

//! ## Overview
//! [`SchemaRegistry::compile`] runs once per process (or per test); every
//! subsequent lookup is a map access. A registry that failed to compile any
//! of the four schemas is not constructed at all, so a validator built over
//! one is never missing a kind.

use jsonschema::Draft;
use jsonschema::Validator;
use thiserror::Error;

use decision_gate_core::RecordKind;

use crate::schemas;

/// Errors raised while compiling the embedded schemas.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A schema's JSON text did not parse.
    #[error("schema text for {kind} is not valid JSON: {source}")]
    Malformed {
        /// The record kind whose schema failed to parse.
        kind: &'static str,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// A schema document did not compile under draft 2020-12.
    #[error("schema for {kind} failed to compile: {source}")]
    Invalid {
        /// The record kind whose schema failed to compile.
        kind: &'static str,
        /// The underlying compilation error.
        #[source]
        source: Box<jsonschema::ValidationError<'static>>,
    },
}

/// A compiled validator per record kind.
///
/// [`RecordKind`] is a closed four-variant set with no ordering, so the
/// registry holds one named field per kind rather than reaching for a map.
pub struct SchemaRegistry {
    auth_context: Validator,
    policy_decision: Validator,
    model_call: Validator,
    tool_call: Validator,
}

impl SchemaRegistry {
    /// Compiles all four embedded schemas under JSON Schema draft 2020-12.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if any schema fails to parse or compile.
    pub fn compile() -> Result<Self, RegistryError> {
        Ok(Self {
            auth_context: compile_one(RecordKind::AuthContext, schemas::AUTH_CONTEXT)?,
            policy_decision: compile_one(RecordKind::PolicyDecision, schemas::POLICY_DECISION)?,
            model_call: compile_one(RecordKind::ModelCall, schemas::MODEL_CALL)?,
            tool_call: compile_one(RecordKind::ToolCall, schemas::TOOL_CALL)?,
        })
    }

    /// Looks up the compiled validator for `kind`.
    #[must_use]
    pub fn get(&self, kind: RecordKind) -> &Validator {
        match kind {
            RecordKind::AuthContext => &self.auth_context,
            RecordKind::PolicyDecision => &self.policy_decision,
            RecordKind::ModelCall => &self.model_call,
            RecordKind::ToolCall => &self.tool_call,
        }
    }
}

fn compile_one(kind: RecordKind, text: &str) -> Result<Validator, RegistryError> {
    let name = kind.as_record_type();
    let schema_value: serde_json::Value =
        serde_json::from_str(text).map_err(|source| RegistryError::Malformed {
            kind: name,
            source,
        })?;
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema_value)
        .map_err(|source| RegistryError::Invalid {
            kind: name,
            source: Box::new(source.to_owned()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_all_four_kinds() {
        let registry = SchemaRegistry::compile().unwrap();
        let _ = registry.get(RecordKind::AuthContext);
        let _ = registry.get(RecordKind::PolicyDecision);
        let _ = registry.get(RecordKind::ModelCall);
        let _ = registry.get(RecordKind::ToolCall);
    }
}
