//! # Semantic Validation Bridge
//!
//! Semantic validation runs over fully built object graphs and is delegated
//! to an injected [`FeatureDefSemanticValidator`]. Join semantic validation
//! needs both the Join and the FeatureDef graphs and has no implementation;
//! it fails fatally instead of reporting a result.

use std::sync::Arc;

use featcfg_core::{
    ConfigValidationError, FeatureDefConfig, FeatureDefSemanticValidator, JoinConfig,
    ValidationResult,
};

/// Name of the unimplemented Join semantic path, used in its error.
pub const JOIN_SEMANTIC_VALIDATION: &str = "Join config semantic validation";

/// Routes built configs to the semantic validator that handles them.
#[derive(Clone)]
pub struct SemanticBridge {
    feature_def: Arc<dyn FeatureDefSemanticValidator>,
}

impl SemanticBridge {
    pub fn new(feature_def: Arc<dyn FeatureDefSemanticValidator>) -> Self {
        Self { feature_def }
    }

    /// Validate a FeatureDef graph. The collaborator's result is returned
    /// unchanged.
    pub fn validate_feature_def(&self, config: &FeatureDefConfig) -> ValidationResult {
        self.feature_def.validate(config)
    }

    /// Validate a Join graph against the FeatureDef graph it references.
    ///
    /// # Errors
    ///
    /// Always returns `ConfigValidationError::NotImplemented`.
    pub fn validate_join(
        &self,
        _join: &JoinConfig,
        _feature_def: &FeatureDefConfig,
    ) -> Result<ValidationResult, ConfigValidationError> {
        Err(ConfigValidationError::NotImplemented(JOIN_SEMANTIC_VALIDATION))
    }
}
