// decision-gate-contract/src/lib.rs
// ============================================================================
// Module: Decision Gate Contract
// Description: Public API surface for the closed-world schema registry and
//              validator (component 11).
// Purpose: Keep JSON Schema compilation and validation out of
//          decision-gate-core, matching that crate's "schema compilation out
//          of the core" canon decision.
// Dependencies: decision-gate-core, jsonschema
// ============================================================================

//! ## Overview
//! This crate owns the four embedded JSON Schema documents for
//! `auth_context`, `policy_decision`, `model_call`, and `tool_call`, compiles
//! them once into a [`SchemaRegistry`], and exposes [`JsonSchemaValidator`]
//! as the `decision_gate_core::SchemaValidator` implementation the commit
//! gate holds as a trait object.

pub mod registry;
pub mod schemas;
pub mod validator;

pub use registry::RegistryError;
pub use registry::SchemaRegistry;
pub use validator::JsonSchemaValidator;
