//! # featcfg-builder — Config Builder and Semantic Rules
//!
//! Reference implementations of the collaborators the validator core is
//! injected with:
//!
//! - [`YamlConfigBuilder`] parses YAML (and therefore JSON) config text into
//!   a [`ParsedConfig`](featcfg_core::ParsedConfig) and deserializes typed
//!   object graphs from it.
//! - [`FeatureDefRules`] is a rule-based
//!   [`FeatureDefSemanticValidator`](featcfg_core::FeatureDefSemanticValidator).

pub mod semantic;
pub mod yaml;

pub use semantic::FeatureDefRules;
pub use yaml::YamlConfigBuilder;
