//! # featcfg-core — Foundational Types for Feature-Config Validation
//!
//! This crate is the leaf of the workspace. It defines the vocabulary shared
//! by the config builder, the semantic rules, and the validator core:
//!
//! 1. **Closed enums for request shape.** [`ConfigType`] and
//!    [`ValidationPhase`] are exhaustive; adding a config type forces every
//!    dispatcher `match` to handle it.
//!
//! 2. **Results versus failures.** A [`ValidationResult`] says something about
//!    the document under test. A [`ConfigValidationError`] says the validator
//!    itself could not do its job. The two are never conflated.
//!
//! 3. **A read-only parsed tree.** [`ParsedConfig`] is what the builder hands
//!    to the validator; it can render itself to JSON for schema checking.
//!
//! 4. **Collaborator seams as traits.** [`ConfigDataProvider`],
//!    [`ConfigBuilder`] and [`FeatureDefSemanticValidator`] are implemented
//!    outside this crate.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `featcfg-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod collaborator;
pub mod config_type;
pub mod error;
pub mod model;
pub mod provider;
pub mod result;
pub mod tree;
pub mod typed_ref;

// Re-export primary types for ergonomic imports.
pub use collaborator::{ConfigBuilder, FeatureDefSemanticValidator};
pub use config_type::{ConfigType, ValidationPhase};
pub use error::{BuildError, ConfigValidationError, RenderError};
pub use model::{
    AnchorConfig, AnchorFeatures, DerivationConfig, DerivationInput, DerivationInputs,
    DerivationSpec, FeatureDefConfig, JoinConfig, KeyedFeatures,
};
pub use provider::{ConfigDataProvider, FileConfigDataProvider, StringConfigDataProvider};
pub use result::{ValidationCause, ValidationResult, ValidationStatus};
pub use tree::ParsedConfig;
pub use typed_ref::{is_strict_typed_ref, TypedRef, TYPED_REF_BNF};
