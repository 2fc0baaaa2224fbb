//! # Collaborator Traits
//!
//! The validator core depends on two collaborators it does not implement:
//! a builder that turns provider text into trees and object graphs, and a
//! semantic validator for built FeatureDef graphs. Both are injected into
//! the validator at construction.

use crate::config_type::ConfigType;
use crate::error::BuildError;
use crate::model::FeatureDefConfig;
use crate::provider::ConfigDataProvider;
use crate::result::ValidationResult;
use crate::tree::ParsedConfig;

/// Builds parsed trees and typed object graphs from config data providers.
pub trait ConfigBuilder: Send + Sync {
    /// Parse the provider's text into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Syntax`] when the document cannot be parsed.
    /// Any other variant is a failure of the builder, not the document.
    fn build_tree(
        &self,
        config_type: ConfigType,
        provider: &dyn ConfigDataProvider,
    ) -> Result<ParsedConfig, BuildError>;

    /// Parse the provider's text and build the FeatureDef object graph.
    fn build_feature_def(
        &self,
        provider: &dyn ConfigDataProvider,
    ) -> Result<FeatureDefConfig, BuildError>;
}

/// Deep content-level validation of a built FeatureDef graph.
pub trait FeatureDefSemanticValidator: Send + Sync {
    fn validate(&self, config: &FeatureDefConfig) -> ValidationResult;
}
