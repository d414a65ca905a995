// decision-gate-contract/src/schemas.rs
// ============================================================================
// Module: Decision Gate Embedded Schemas
// Description: The four closed-world JSON Schema documents, one per
//              commit-able record kind.
// Purpose: Give the registry a single place to find each kind's schema
//          text, independent of how it gets parsed or compiled.
// Dependencies: none (plain JSON text)
// ============================================================================

//! ## Overview
//! Every schema below sets `additionalProperties: false` at every object
//! level, matching the closed-world contract (§3): a record with an extra
//! field is rejected the same way as one missing a required field. Shared
//! shapes (`trace_context`, `producer`, tokens, hashes) are local `$defs`
//! inside each document rather than split across files, so each schema
//! compiles standalone.

/// Schema text for the `auth_context` record kind.
pub const AUTH_CONTEXT: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "$id": "https://decision-gate.example/schemas/auth_context.json",
  "type": "object",
  "properties": {
    "record_type": { "const": "auth_context" },
    "spec_version": { "const": "1.0.0" },
    "canon_version": { "const": "1" },
    "trace": { "$ref": "#/$defs/trace_context" },
    "producer": { "$ref": "#/$defs/producer" },
    "ts_ms": { "type": "integer", "minimum": 0 },
    "actor": {
      "type": "object",
      "properties": {
        "actor_kind": { "$ref": "#/$defs/token" },
        "actor_id": { "$ref": "#/$defs/token" }
      },
      "required": ["actor_kind", "actor_id"],
      "additionalProperties": false
    },
    "credential": {
      "type": "object",
      "properties": {
        "credential_kind": { "$ref": "#/$defs/token" },
        "issuer": { "$ref": "#/$defs/token" },
        "presented_hash_sha256": { "$ref": "#/$defs/hex_digest" },
        "verified_at_ms": { "type": "integer", "minimum": 0 },
        "expires_at_ms": { "type": "integer", "minimum": 0 }
      },
      "required": [
        "credential_kind",
        "issuer",
        "presented_hash_sha256",
        "verified_at_ms",
        "expires_at_ms"
      ],
      "additionalProperties": false
    },
    "grants": {
      "type": "object",
      "additionalProperties": { "const": true }
    }
  },
  "required": [
    "record_type",
    "spec_version",
    "canon_version",
    "trace",
    "producer",
    "ts_ms",
    "actor",
    "credential",
    "grants"
  ],
  "additionalProperties": false,
  "$defs": {
    "token": { "type": "string", "pattern": "^[a-z0-9][a-z0-9_\\-:.]{0,127}$" },
    "hex_digest": { "type": "string", "pattern": "^[0-9a-f]{64}$" },
    "trace_context": {
      "type": "object",
      "properties": {
        "trace_id": { "type": "string", "pattern": "^[0-9a-f]{32}$" },
        "span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" },
        "span_kind": { "$ref": "#/$defs/token" },
        "parent_span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" }
      },
      "required": ["trace_id", "span_id", "span_kind"],
      "additionalProperties": false
    },
    "producer": {
      "type": "object",
      "properties": {
        "layer": { "$ref": "#/$defs/token" },
        "component": { "$ref": "#/$defs/token" }
      },
      "required": ["layer", "component"],
      "additionalProperties": false
    }
  }
}"#;

/// Schema text for the `policy_decision` record kind.
pub const POLICY_DECISION: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "$id": "https://decision-gate.example/schemas/policy_decision.json",
  "type": "object",
  "properties": {
    "record_type": { "const": "policy_decision" },
    "spec_version": { "const": "1.0.0" },
    "canon_version": { "const": "1" },
    "trace": { "$ref": "#/$defs/trace_context" },
    "producer": { "$ref": "#/$defs/producer" },
    "ts_ms": { "type": "integer", "minimum": 0 },
    "auth_context_envelope_sha256": { "$ref": "#/$defs/hex_digest" },
    "policy": {
      "type": "object",
      "properties": {
        "policy_id": { "$ref": "#/$defs/token" },
        "policy_version": { "$ref": "#/$defs/token" },
        "policy_sha256": { "$ref": "#/$defs/hex_digest" }
      },
      "required": ["policy_id", "policy_version", "policy_sha256"],
      "additionalProperties": false
    },
    "request": {
      "type": "object",
      "properties": {
        "action": { "$ref": "#/$defs/token" },
        "resource": { "type": "string", "pattern": "^[a-z0-9][a-z0-9_\\-:./]{0,255}$" }
      },
      "required": ["action", "resource"],
      "additionalProperties": false
    },
    "decision": {
      "type": "object",
      "properties": {
        "result": { "enum": ["allow", "deny"] },
        "reason_codes": { "type": "object", "additionalProperties": { "const": true } },
        "obligations": { "type": "object", "additionalProperties": { "const": true } }
      },
      "required": ["result", "reason_codes", "obligations"],
      "additionalProperties": false
    }
  },
  "required": [
    "record_type",
    "spec_version",
    "canon_version",
    "trace",
    "producer",
    "ts_ms",
    "auth_context_envelope_sha256",
    "policy",
    "request",
    "decision"
  ],
  "additionalProperties": false,
  "$defs": {
    "token": { "type": "string", "pattern": "^[a-z0-9][a-z0-9_\\-:.]{0,127}$" },
    "hex_digest": { "type": "string", "pattern": "^[0-9a-f]{64}$" },
    "trace_context": {
      "type": "object",
      "properties": {
        "trace_id": { "type": "string", "pattern": "^[0-9a-f]{32}$" },
        "span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" },
        "span_kind": { "$ref": "#/$defs/token" },
        "parent_span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" }
      },
      "required": ["trace_id", "span_id", "span_kind"],
      "additionalProperties": false
    },
    "producer": {
      "type": "object",
      "properties": {
        "layer": { "$ref": "#/$defs/token" },
        "component": { "$ref": "#/$defs/token" }
      },
      "required": ["layer", "component"],
      "additionalProperties": false
    }
  }
}"#;

/// Schema text shared by `model_call` and `tool_call`: everything but the
/// kind-specific identifier block.
macro_rules! evidence_common_properties {
    () => {
        r#""spec_version": { "const": "1.0.0" },
    "canon_version": { "const": "1" },
    "trace": { "$ref": "#/$defs/trace_context" },
    "producer": { "$ref": "#/$defs/producer" },
    "started_at_ms": { "type": "integer", "minimum": 0 },
    "ended_at_ms": { "type": "integer", "minimum": 0 },
    "auth_context_envelope_sha256": { "$ref": "#/$defs/hex_digest" },
    "policy_decision_envelope_sha256": { "$ref": "#/$defs/hex_digest" },
    "request": { "$ref": "#/$defs/content_ref" },
    "response": { "$ref": "#/$defs/content_ref" },
    "outcome": {
      "type": "object",
      "properties": { "status": { "$ref": "#/$defs/token" } },
      "required": ["status"],
      "additionalProperties": false
    },
    "allow_response_blobref": { "type": "boolean" }"#
    };
}

/// Schema text for the `model_call` record kind.
pub const MODEL_CALL: &str = concat!(
    r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "$id": "https://decision-gate.example/schemas/model_call.json",
  "type": "object",
  "properties": {
    "record_type": { "const": "model_call" },
    "#,
    evidence_common_properties!(),
    r#",
    "model": {
      "type": "object",
      "properties": {
        "model_id": { "$ref": "#/$defs/token" },
        "model_version": { "$ref": "#/$defs/token" }
      },
      "required": ["model_id", "model_version"],
      "additionalProperties": false
    },
    "usage": {
      "type": "object",
      "properties": {
        "input_tokens": { "type": "integer", "minimum": 0 },
        "output_tokens": { "type": "integer", "minimum": 0 }
      },
      "required": ["input_tokens", "output_tokens"],
      "additionalProperties": false
    }
  },
  "required": [
    "record_type", "spec_version", "canon_version", "trace", "producer",
    "started_at_ms", "ended_at_ms", "auth_context_envelope_sha256",
    "policy_decision_envelope_sha256", "request", "response", "outcome", "model"
  ],
  "additionalProperties": false,
  "$defs": {
    "token": { "type": "string", "pattern": "^[a-z0-9][a-z0-9_\\-:.]{0,127}$" },
    "hex_digest": { "type": "string", "pattern": "^[0-9a-f]{64}$" },
    "content_ref": {
      "type": "object",
      "properties": {
        "content_type": { "$ref": "#/$defs/token" },
        "sha256": { "$ref": "#/$defs/hex_digest" },
        "size_bytes": { "type": "integer", "minimum": 0 }
      },
      "required": ["content_type", "sha256", "size_bytes"],
      "additionalProperties": false
    },
    "trace_context": {
      "type": "object",
      "properties": {
        "trace_id": { "type": "string", "pattern": "^[0-9a-f]{32}$" },
        "span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" },
        "span_kind": { "$ref": "#/$defs/token" },
        "parent_span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" }
      },
      "required": ["trace_id", "span_id", "span_kind"],
      "additionalProperties": false
    },
    "producer": {
      "type": "object",
      "properties": {
        "layer": { "$ref": "#/$defs/token" },
        "component": { "$ref": "#/$defs/token" }
      },
      "required": ["layer", "component"],
      "additionalProperties": false
    }
  }
}"#
);

/// Schema text for the `tool_call` record kind.
pub const TOOL_CALL: &str = concat!(
    r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "$id": "https://decision-gate.example/schemas/tool_call.json",
  "type": "object",
  "properties": {
    "record_type": { "const": "tool_call" },
    "#,
    evidence_common_properties!(),
    r#",
    "tool": {
      "type": "object",
      "properties": {
        "tool_id": { "$ref": "#/$defs/token" },
        "tool_version": { "$ref": "#/$defs/token" }
      },
      "required": ["tool_id", "tool_version"],
      "additionalProperties": false
    }
  },
  "required": [
    "record_type", "spec_version", "canon_version", "trace", "producer",
    "started_at_ms", "ended_at_ms", "auth_context_envelope_sha256",
    "policy_decision_envelope_sha256", "request", "response", "outcome", "tool"
  ],
  "additionalProperties": false,
  "$defs": {
    "token": { "type": "string", "pattern": "^[a-z0-9][a-z0-9_\\-:.]{0,127}$" },
    "hex_digest": { "type": "string", "pattern": "^[0-9a-f]{64}$" },
    "content_ref": {
      "type": "object",
      "properties": {
        "content_type": { "$ref": "#/$defs/token" },
        "sha256": { "$ref": "#/$defs/hex_digest" },
        "size_bytes": { "type": "integer", "minimum": 0 }
      },
      "required": ["content_type", "sha256", "size_bytes"],
      "additionalProperties": false
    },
    "trace_context": {
      "type": "object",
      "properties": {
        "trace_id": { "type": "string", "pattern": "^[0-9a-f]{32}$" },
        "span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" },
        "span_kind": { "$ref": "#/$defs/token" },
        "parent_span_id": { "type": "string", "pattern": "^[0-9a-f]{16}$" }
      },
      "required": ["trace_id", "span_id", "span_kind"],
      "additionalProperties": false
    },
    "producer": {
      "type": "object",
      "properties": {
        "layer": { "$ref": "#/$defs/token" },
        "component": { "$ref": "#/$defs/token" }
      },
      "required": ["layer", "component"],
      "additionalProperties": false
    }
  }
}"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_schema_is_well_formed_json() {
        for text in [AUTH_CONTEXT, POLICY_DECISION, MODEL_CALL, TOOL_CALL] {
            let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
            assert!(parsed.is_object());
        }
    }
}
