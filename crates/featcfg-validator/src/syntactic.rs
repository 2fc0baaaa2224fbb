//! # Syntactic Validation
//!
//! Structural conformance of a parsed config tree:
//!
//! 1. Render the tree to JSON text and parse it back into a document.
//! 2. Validate the document against the cached schema for its config type,
//!    collecting every violation rather than stopping at the first.
//! 3. For FeatureDef configs that pass the schema, run the naming
//!    convention checker and return its result.
//!
//! A tree JSON cannot represent (non-finite floats, non-scalar keys, keys
//! that collide once stringified) is an `Invalid` result whose cause is the
//! [`RenderError`]. Schema violations are an `Invalid` result whose cause is
//! a [`SchemaViolationError`]. Every other failure on this path is fatal.

use std::fmt;

use featcfg_core::{
    ConfigType, ConfigValidationError, ParsedConfig, RenderError, ValidationPhase, ValidationResult,
};
use serde_json::Value;
use thiserror::Error;

use crate::naming;
use crate::options::ValidatorOptions;
use crate::schema::{schema_resource, SchemaCache};

/// One schema failure, located in both the config document and the schema.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Pointer into the config document, empty for the document root.
    pub instance_path: String,
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "<document>"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "  {at}: {}", self.message)
    }
}

/// Every schema failure of one document, in the order jsonschema reported
/// them. Displays one violation per line.
#[derive(Debug, Clone, Default)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.violations.iter().map(Violation::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

/// Cause attached to an `Invalid` result when a document fails its schema.
#[derive(Error, Debug, Clone)]
#[error("{config_type} config does not conform to schema '{schema_name}':\n{violations}")]
pub struct SchemaViolationError {
    pub config_type: ConfigType,
    pub schema_name: String,
    pub violations: ValidationViolations,
}

/// Validate the syntax of a parsed config tree.
///
/// # Errors
///
/// Returns a fatal error if JSON encoding fails, the schema cannot be
/// loaded, or FeatureDef name extraction meets a shape the schema should
/// have rejected.
pub fn validate_syntax(
    schemas: &SchemaCache,
    options: &ValidatorOptions,
    config_type: ConfigType,
    tree: &ParsedConfig,
) -> Result<ValidationResult, ConfigValidationError> {
    let document = match tree.to_json_value() {
        Ok(document) => document,
        Err(e) if e.is_document_defect() => {
            let message =
                format!("{config_type} config cannot be represented as a JSON document: {e}");
            tracing::debug!(%config_type, error = %e, "config tree not renderable");
            return Ok(ValidationResult::invalid_with_cause(ValidationPhase::Syntactic, message, e));
        }
        Err(e) => return Err(e.into()),
    };
    let text = serde_json::to_string_pretty(&document).map_err(RenderError::from)?;
    let document: Value = serde_json::from_str(&text).map_err(RenderError::from)?;

    let schema = schemas.get(config_type)?;
    let violations: Vec<Violation> = schema
        .iter_errors(&document)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    let result = if !violations.is_empty() {
        let violations = ValidationViolations { violations };
        let message = format!("{config_type} config syntax is invalid. Details:\n{violations}");
        ValidationResult::invalid_with_cause(
            ValidationPhase::Syntactic,
            message,
            SchemaViolationError {
                config_type,
                schema_name: schema_resource(config_type).to_string(),
                violations,
            },
        )
    } else {
        match config_type {
            ConfigType::FeatureDef => naming::check_feature_def_names(tree, options.naming_policy)?,
            ConfigType::Join | ConfigType::Presentation => {
                ValidationResult::valid(ValidationPhase::Syntactic)
            }
        }
    };

    tracing::debug!(%config_type, status = %result.status(), "validated config syntax");
    Ok(result)
}
