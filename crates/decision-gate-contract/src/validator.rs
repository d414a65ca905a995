// decision-gate-contract/src/validator.rs
// ============================================================================
// Module: Decision Gate JSON Schema Validator
// Description: The `SchemaValidator` implementation the commit gate holds
//              as a trait object.
// Purpose: Translate `jsonschema` validation failures into the stable
//          `schema_violation.*` error-kind strings the gate and test
//          vectors depend on.
// Dependencies: decision-gate-core, jsonschema
// ============================================================================

//! ## Overview
//! [`JsonSchemaValidator::validate`] selects a schema from the value's own
//! `record_type` field, then reports the first validation error in schema
//! order (§4.5 step 2). Errors outside the handful of kinds test vectors
//! name (`required`, `additionalProperties`, `pattern`, `enum`, `type`) fall
//! back to `schema_violation.type`, which is the closest stable kind for a
//! structural mismatch this registry's schemas do not otherwise produce.

use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

use decision_gate_core::ErrorKind;
use decision_gate_core::RecordKind;
use decision_gate_core::SchemaError;
use decision_gate_core::SchemaValidator;

use crate::registry::SchemaRegistry;

/// Closed-world JSON Schema validator over the four embedded schemas.
pub struct JsonSchemaValidator {
    registry: SchemaRegistry,
}

impl JsonSchemaValidator {
    /// Compiles the embedded schemas and builds a validator over them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegistryError`] if the embedded schemas fail to
    /// compile, which would indicate a defect in this crate rather than in
    /// any submitted record.
    pub fn new() -> Result<Self, crate::RegistryError> {
        Ok(Self {
            registry: SchemaRegistry::compile()?,
        })
    }

    /// Builds a validator over an already-compiled registry.
    #[must_use]
    pub fn with_registry(registry: SchemaRegistry) -> Self {
        Self { registry }
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, value: &Value) -> Result<RecordKind, SchemaError> {
        let declared = value
            .get("record_type")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::new(ErrorKind::schema_required("record_type")))?;
        let kind = RecordKind::from_record_type(declared)
            .ok_or_else(|| SchemaError::new(ErrorKind::record_type_forbidden()))?;

        if value
            .get("trace")
            .and_then(|trace| trace.get("trace_id"))
            .is_none()
        {
            return Err(SchemaError::new(ErrorKind::schema_missing_trace_id()));
        }

        let validator = self.registry.get(kind);
        if let Some(first) = validator.iter_errors(value).next() {
            return Err(SchemaError::new(kind_from_validation_error(&first)));
        }

        Ok(kind)
    }
}

/// Maps a `jsonschema` validation error to this crate's stable error-kind
/// strings.
fn kind_from_validation_error(error: &jsonschema::ValidationError<'_>) -> ErrorKind {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            ErrorKind::schema_required(property.as_str().unwrap_or("unknown"))
        }
        ValidationErrorKind::AdditionalProperties { .. } => {
            ErrorKind::schema_additional_properties()
        }
        ValidationErrorKind::Pattern { .. } => ErrorKind::schema_pattern(),
        ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => {
            ErrorKind::schema_enum()
        }
        ValidationErrorKind::Type { .. } => ErrorKind::schema_type(),
        _ => ErrorKind::schema_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth_context_value() -> Value {
        json!({
            "record_type": "auth_context",
            "spec_version": "1.0.0",
            "canon_version": "1",
            "trace": {
                "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736",
                "span_id": "00f067aa0ba902b7",
                "span_kind": "root"
            },
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

    #[test]
    fn accepts_well_formed_auth_context() {
        let validator = JsonSchemaValidator::new().unwrap();
        assert_eq!(
            validator.validate(&auth_context_value()).unwrap(),
            RecordKind::AuthContext
        );
    }

    #[test]
    fn rejects_missing_required_field() {
        let validator = JsonSchemaValidator::new().unwrap();
        let mut value = auth_context_value();
        value.as_object_mut().unwrap().remove("ts_ms");
        let err = validator.validate(&value).unwrap_err();
        assert_eq!(err.kind.as_str(), "schema_violation.required.ts_ms");
    }

    #[test]
    fn rejects_additional_property() {
        let validator = JsonSchemaValidator::new().unwrap();
        let mut value = auth_context_value();
        value
            .as_object_mut()
            .unwrap()
            .insert("unexpected".to_string(), json!("x"));
        let err = validator.validate(&value).unwrap_err();
        assert_eq!(err.kind.as_str(), "schema_violation.additional_properties");
    }

    #[test]
    fn rejects_bad_pattern() {
        let validator = JsonSchemaValidator::new().unwrap();
        let mut value = auth_context_value();
        value["trace"]["trace_id"] = json!("not-hex");
        let err = validator.validate(&value).unwrap_err();
        assert_eq!(err.kind.as_str(), "schema_violation.pattern");
    }

    #[test]
    fn rejects_bad_enum_value() {
        let validator = JsonSchemaValidator::new().unwrap();
        let mut value = json!({
            "record_type": "policy_decision",
            "spec_version": "1.0.0",
            "canon_version": "1",
            "trace": {
                "trace_id": "4bf92f3577b34da6a3ce929d0e0e4736",
                "span_id": "00f067aa0ba902b7",
                "span_kind": "child"
            },
            "producer": { "layer": "policy", "component": "decider" },
            "ts_ms": 1_769_817_600_000_u64,
            "auth_context_envelope_sha256": "a".repeat(64),
            "policy": {
                "policy_id": "p1",
                "policy_version": "v1",
                "policy_sha256": "b".repeat(64)
            },
            "request": { "action": "invoke", "resource": "tenants/acme" },
            "decision": {
                "result": "maybe",
                "reason_codes": {},
                "obligations": {}
            }
        });
        let err = validator.validate(&value).unwrap_err();
        assert_eq!(err.kind.as_str(), "schema_violation.enum");
        value["decision"]["result"] = json!("allow");
        assert!(validator.validate(&value).is_ok());
    }

    #[test]
    fn rejects_record_missing_trace_id_with_dedicated_kind() {
        let validator = JsonSchemaValidator::new().unwrap();
        let mut value = auth_context_value();
        value["trace"].as_object_mut().unwrap().remove("trace_id");
        let err = validator.validate(&value).unwrap_err();
        assert_eq!(err.kind.as_str(), "schema_violation.trace_context.missing_trace_id");
    }

    #[test]
    fn rejects_unknown_record_type() {
        let validator = JsonSchemaValidator::new().unwrap();
        let mut value = auth_context_value();
        value["record_type"] = json!("something_else");
        let err = validator.validate(&value).unwrap_err();
        assert_eq!(err.kind.as_str(), "record_type_forbidden");
    }
}
