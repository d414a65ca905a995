// decision-gate-config/src/config.rs
// ============================================================================
// Module: Decision Gate Canon Configuration
// Description: The TOML-backed configuration document pinning a deployment
//              to a spec/canon revision and default variance policy.
// Purpose: Validate cross-field constraints (the loaded `spec_version` and
//          `canon_version` must match this binary's compiled-in constants)
//          at load time rather than scattering the check across call sites.
// Dependencies: decision-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! A deployment that loads a config built against a different canon revision
//! than the binary it runs with is a configuration error, not a runtime
//! one — [`load_canon_config`] rejects the mismatch immediately rather than
//! letting it surface later as a confusing schema or hash failure.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use decision_gate_core::CANON_VERSION;
use decision_gate_core::SPEC_VERSION;
use decision_gate_core::VariancePolicy;

/// Errors raised while loading or validating a canon configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file was not valid TOML, or did not match the
    /// expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The loaded `spec_version` did not match this build's compiled-in
    /// spec version.
    #[error("config spec_version {found:?} does not match compiled spec_version {expected:?}")]
    SpecVersionMismatch {
        /// The value found in the config file.
        found: String,
        /// This build's compiled-in spec version.
        expected: &'static str,
    },
    /// The loaded `canon_version` did not match this build's compiled-in
    /// canon version.
    #[error("config canon_version {found:?} does not match compiled canon_version {expected:?}")]
    CanonVersionMismatch {
        /// The value found in the config file.
        found: String,
        /// This build's compiled-in canon version.
        expected: &'static str,
    },
}

/// The canon configuration document: spec/canon pinning and the default
/// constrained-replay variance policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonConfig {
    /// The spec version this deployment was configured against. Must equal
    /// [`decision_gate_core::SPEC_VERSION`] at load time.
    pub spec_version: String,
    /// The canon version this deployment was configured against. Must equal
    /// [`decision_gate_core::CANON_VERSION`] at load time.
    pub canon_version: String,
    /// The default variance policy constrained replay uses when a caller
    /// does not supply one explicitly.
    #[serde(default)]
    pub default_variance_policy: VariancePolicy,
}

impl CanonConfig {
    /// Validates this config's spec/canon pinning against the compiled-in
    /// constants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SpecVersionMismatch`] or
    /// [`ConfigError::CanonVersionMismatch`] on disagreement.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spec_version != SPEC_VERSION {
            return Err(ConfigError::SpecVersionMismatch {
                found: self.spec_version.clone(),
                expected: SPEC_VERSION,
            });
        }
        if self.canon_version != CANON_VERSION {
            return Err(ConfigError::CanonVersionMismatch {
                found: self.canon_version.clone(),
                expected: CANON_VERSION,
            });
        }
        Ok(())
    }

    /// Returns the configured default variance policy.
    #[must_use]
    pub fn variance_policy(&self) -> VariancePolicy {
        self.default_variance_policy
    }
}

/// Loads and validates a [`CanonConfig`] from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
/// if it is not valid TOML, or a version-mismatch variant if the loaded
/// spec/canon pinning disagrees with this build.
pub fn load_canon_config(path: &Path) -> Result<CanonConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: CanonConfig = toml::from_str(&text)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_matching_config() {
        let file = write_config(&format!(
            "spec_version = \"{SPEC_VERSION}\"\ncanon_version = \"{CANON_VERSION}\"\n"
        ));
        let config = load_canon_config(file.path()).unwrap();
        assert_eq!(config.variance_policy(), VariancePolicy::strict());
    }

    #[test]
    fn rejects_spec_version_mismatch() {
        let file = write_config(&format!(
            "spec_version = \"0.0.0\"\ncanon_version = \"{CANON_VERSION}\"\n"
        ));
        let err = load_canon_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::SpecVersionMismatch { .. }));
    }

    #[test]
    fn rejects_canon_version_mismatch() {
        let file = write_config(&format!(
            "spec_version = \"{SPEC_VERSION}\"\ncanon_version = \"999\"\n"
        ));
        let err = load_canon_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::CanonVersionMismatch { .. }));
    }

    #[test]
    fn loads_explicit_permissive_policy() {
        let file = write_config(&format!(
            "spec_version = \"{SPEC_VERSION}\"\ncanon_version = \"{CANON_VERSION}\"\n[default_variance_policy]\nallow_model_call_variance = true\nallow_tool_call_variance = true\n"
        ));
        let config = load_canon_config(file.path()).unwrap();
        assert_eq!(config.variance_policy(), VariancePolicy::permissive());
    }
}
