//! # Validation Dispatcher
//!
//! [`ConfigValidator`] is the single entry point. It builds a parsed tree
//! (or object graph) through the injected [`ConfigBuilder`] and routes the
//! request to the syntactic or semantic path.
//!
//! ## Outcomes
//!
//! | Situation | Outcome |
//! |-----------|---------|
//! | Document text does not parse | `Ok`, `Invalid` result with the parse error as cause |
//! | Document fails its schema | `Ok`, `Invalid` result |
//! | Document has no JSON form (non-finite float, colliding keys) | `Ok`, `Invalid` result |
//! | FeatureDef names break conventions | `Ok`, `Warn`; `Invalid` under `NamingPolicy::Strict` |
//! | Semantic validation of a Join config | `Err`, not implemented |
//! | Semantic validation of a Presentation config | `Err`, unsupported |
//! | Schema missing or broken, builder failure, unexpected tree shape | `Err` |
//!
//! Every `Err` leaving [`ConfigValidator::validate`] is wrapped in
//! `ConfigValidationError::Request` naming the config type, phase and data
//! source.
//!
//! ## Logging
//!
//! Events go to the caller's current `tracing` subscriber unless a
//! dispatcher is injected with [`ConfigValidator::with_dispatch`], in which
//! case every public call runs under that dispatcher.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use featcfg_core::{
    ConfigBuilder, ConfigDataProvider, ConfigType, ConfigValidationError, FeatureDefConfig,
    FeatureDefSemanticValidator, JoinConfig, ParsedConfig, ValidationPhase, ValidationResult,
};

use crate::options::ValidatorOptions;
use crate::schema::{SchemaCache, SchemaSource};
use crate::semantic::{SemanticBridge, JOIN_SEMANTIC_VALIDATION};
use crate::syntactic;

/// Validates feature-platform config documents.
///
/// `ConfigValidator` is `Send + Sync`; one instance can serve concurrent
/// callers and shares its schema cache between them.
pub struct ConfigValidator {
    builder: Arc<dyn ConfigBuilder>,
    semantics: SemanticBridge,
    schemas: SchemaCache,
    options: ValidatorOptions,
    dispatch: Option<tracing::Dispatch>,
}

impl ConfigValidator {
    /// Create a validator over the bundled schemas with default options.
    pub fn new(
        builder: Arc<dyn ConfigBuilder>,
        semantic: Arc<dyn FeatureDefSemanticValidator>,
    ) -> Self {
        Self {
            builder,
            semantics: SemanticBridge::new(semantic),
            schemas: SchemaCache::bundled(),
            options: ValidatorOptions::default(),
            dispatch: None,
        }
    }

    /// Load schemas from `source` instead of the bundled documents.
    ///
    /// Replaces the schema cache, discarding anything already loaded.
    pub fn with_schema_source(mut self, source: Arc<dyn SchemaSource>) -> Self {
        self.schemas = SchemaCache::new(source);
        self
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Send this validator's log events to `dispatch`.
    pub fn with_dispatch(mut self, dispatch: tracing::Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Validate the config document behind `provider`.
    ///
    /// # Errors
    ///
    /// Returns a fatal error when the request itself cannot be served; see
    /// the module documentation for which situations are results and which
    /// are errors.
    pub fn validate(
        &self,
        config_type: ConfigType,
        phase: ValidationPhase,
        provider: &dyn ConfigDataProvider,
    ) -> Result<ValidationResult, ConfigValidationError> {
        self.scoped(|| {
            let data_info = provider.config_data_info();
            let result = match phase {
                ValidationPhase::Syntactic => self.validate_syntactic(config_type, provider),
                ValidationPhase::Semantic => self.validate_semantic(config_type, provider),
            }
            .map_err(|e| e.in_request(config_type, phase, data_info.as_str()))?;

            tracing::info!(
                %phase,
                %config_type,
                %data_info,
                status = %result.status(),
                "performed config validation"
            );
            Ok(result)
        })
    }

    /// Validate several config documents in one phase.
    ///
    /// Entries are validated in key order and independently of each other.
    /// The first fatal error aborts the batch and is returned.
    pub fn validate_all(
        &self,
        providers: &BTreeMap<ConfigType, Box<dyn ConfigDataProvider>>,
        phase: ValidationPhase,
    ) -> Result<BTreeMap<ConfigType, ValidationResult>, ConfigValidationError> {
        let mut results = BTreeMap::new();
        for (&config_type, provider) in providers {
            let result = self.validate(config_type, phase, provider.as_ref())?;
            results.insert(config_type, result);
        }
        Ok(results)
    }

    /// Validate the syntax of an already parsed tree.
    pub fn validate_syntax(
        &self,
        config_type: ConfigType,
        tree: &ParsedConfig,
    ) -> Result<ValidationResult, ConfigValidationError> {
        self.scoped(|| syntactic::validate_syntax(&self.schemas, &self.options, config_type, tree))
    }

    /// Semantically validate a built FeatureDef graph.
    pub fn validate_feature_def_semantics(&self, config: &FeatureDefConfig) -> ValidationResult {
        self.scoped(|| self.semantics.validate_feature_def(config))
    }

    /// Semantically validate a built Join graph.
    ///
    /// # Errors
    ///
    /// Join semantic validation is not implemented; this always fails.
    pub fn validate_join_semantics(
        &self,
        join: &JoinConfig,
        feature_def: &FeatureDefConfig,
    ) -> Result<ValidationResult, ConfigValidationError> {
        self.scoped(|| self.semantics.validate_join(join, feature_def))
    }

    fn validate_syntactic(
        &self,
        config_type: ConfigType,
        provider: &dyn ConfigDataProvider,
    ) -> Result<ValidationResult, ConfigValidationError> {
        let tree = match self.builder.build_tree(config_type, provider) {
            Ok(tree) => tree,
            Err(e) if e.is_syntax() => {
                let message = format!("Config parsing failed due to invalid syntax: {e}");
                return Ok(ValidationResult::invalid_with_cause(
                    ValidationPhase::Syntactic,
                    message,
                    e,
                ));
            }
            Err(e) => return Err(e.into()),
        };
        syntactic::validate_syntax(&self.schemas, &self.options, config_type, &tree)
    }

    fn validate_semantic(
        &self,
        config_type: ConfigType,
        provider: &dyn ConfigDataProvider,
    ) -> Result<ValidationResult, ConfigValidationError> {
        match config_type {
            ConfigType::FeatureDef => {
                let config = self.builder.build_feature_def(provider)?;
                Ok(self.semantics.validate_feature_def(&config))
            }
            ConfigType::Join => {
                Err(ConfigValidationError::NotImplemented(JOIN_SEMANTIC_VALIDATION))
            }
            ConfigType::Presentation => Err(ConfigValidationError::Unsupported {
                config_type,
                phase: ValidationPhase::Semantic,
            }),
        }
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl fmt::Debug for ConfigValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigValidator")
            .field("schemas", &self.schemas)
            .field("options", &self.options)
            .field("dispatch", &self.dispatch.is_some())
            .finish_non_exhaustive()
    }
}
