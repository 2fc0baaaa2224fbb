//! # featcfg-validator — Config Validation Core
//!
//! Validates feature-platform config documents (FeatureDef, Join,
//! Presentation) before downstream builders consume them.
//!
//! ## Phases
//!
//! - **Syntactic** ([`syntactic`]): the document parses, conforms to the
//!   bundled JSON Schema for its type, and (FeatureDef only) follows the
//!   naming conventions checked by [`naming`].
//! - **Semantic** ([`semantic`]): the built object graph obeys domain rules,
//!   delegated to an injected validator.
//!
//! [`ConfigValidator`] dispatches a `(config type, phase, data source)`
//! request to the right path, or validates a batch of documents in one call.
//!
//! ## Crate Policy
//!
//! - Document defects are returned as
//!   [`ValidationResult`](featcfg_core::ValidationResult)s. A returned
//!   `Err` means the request could not be served.
//! - Naming violations are advisory by default and never escalate unless
//!   [`NamingPolicy::Strict`] is configured.
//! - Schemas are loaded from bundled documents at most once per config type
//!   per validator.

pub mod naming;
pub mod options;
pub mod schema;
pub mod semantic;
pub mod syntactic;
pub mod validator;

pub use naming::{collect_feature_def_names, AnchorFeatureNames, FeatureDefNames, NamingViolations};
pub use options::{NamingPolicy, ValidatorOptions};
pub use schema::{schema_resource, BundledSchemas, SchemaCache, SchemaSource};
pub use semantic::SemanticBridge;
pub use syntactic::{SchemaViolationError, ValidationViolations, Violation};
pub use validator::ConfigValidator;
