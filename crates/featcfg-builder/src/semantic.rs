//! # FeatureDef Semantic Rules
//!
//! Content-level checks over a built [`FeatureDefConfig`]:
//!
//! | Rule | Severity |
//! |------|----------|
//! | A feature is defined more than once (two anchors, or anchored and derived) | `Invalid` |
//! | A derivation input names a feature not defined in the same document | `Warn` |
//!
//! Undefined inputs only warn because a derivation may consume features
//! defined in another FeatureDef document. The most severe finding decides
//! the status; every finding is reported.

use std::collections::BTreeSet;

use featcfg_core::{
    FeatureDefConfig, FeatureDefSemanticValidator, ValidationPhase, ValidationResult,
    ValidationStatus,
};

/// Rule-based semantic validator for FeatureDef configs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureDefRules;

impl FeatureDefRules {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureDefSemanticValidator for FeatureDefRules {
    fn validate(&self, config: &FeatureDefConfig) -> ValidationResult {
        let mut findings: Vec<(ValidationStatus, String)> = Vec::new();
        let definitions = config.feature_definitions();

        let duplicates: Vec<String> = definitions
            .iter()
            .filter(|(_, places)| places.len() > 1)
            .map(|(name, places)| format!("{name} (defined in {})", places.join(", ")))
            .collect();
        if !duplicates.is_empty() {
            findings.push((
                ValidationStatus::Invalid,
                format!(
                    "The following features are defined more than once:\n{}",
                    duplicates.join("\n")
                ),
            ));
        }

        let defined = &definitions;
        let undefined: BTreeSet<String> = config
            .derivations
            .iter()
            .flat_map(|(derived, d)| {
                d.input_features()
                    .into_iter()
                    .filter(move |input| !defined.contains_key(*input))
                    .map(move |input| format!("{input} (input of {derived})"))
            })
            .collect();
        if !undefined.is_empty() {
            findings.push((
                ValidationStatus::Warn,
                format!(
                    "The following derivation inputs are not defined in this config:\n{}",
                    undefined.into_iter().collect::<Vec<_>>().join("\n")
                ),
            ));
        }

        let Some(status) = findings.iter().map(|(s, _)| *s).max() else {
            return ValidationResult::valid(ValidationPhase::Semantic);
        };
        let message = findings
            .into_iter()
            .map(|(_, m)| m)
            .collect::<Vec<_>>()
            .join("\n");
        tracing::debug!(%status, "FeatureDef semantic rules found problems");
        ValidationResult::with_status(ValidationPhase::Semantic, status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> FeatureDefConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_clean_config_is_valid() {
        let cfg = config(json!({
            "anchors": {"a1": {"source": "s1", "features": ["f1", "f2"]}},
            "derivations": {
                "f3": {"definition": "x + y", "inputs": {
                    "x": {"key": "k", "feature": "f1"},
                    "y": {"key": "k", "feature": "f2"}
                }}
            }
        }));
        let r = FeatureDefRules::new().validate(&cfg);
        assert!(r.is_valid(), "{r}");
        assert_eq!(r.phase(), ValidationPhase::Semantic);
    }

    #[test]
    fn test_duplicate_feature_is_invalid() {
        let cfg = config(json!({
            "anchors": {
                "a1": {"source": "s1", "features": ["f1"]},
                "a2": {"source": "s2", "features": {"f1": {"def": "x"}}}
            }
        }));
        let r = FeatureDefRules::new().validate(&cfg);
        assert_eq!(r.status(), ValidationStatus::Invalid);
        let msg = r.message().unwrap();
        assert!(msg.contains("f1 (defined in anchors.a1, anchors.a2)"), "{msg}");
    }

    #[test]
    fn test_anchored_and_derived_is_invalid() {
        let cfg = config(json!({
            "anchors": {"a1": {"source": "s1", "features": ["f1"]}},
            "derivations": {"f1": "f1 * 2"}
        }));
        let r = FeatureDefRules::new().validate(&cfg);
        assert_eq!(r.status(), ValidationStatus::Invalid);
    }

    #[test]
    fn test_undefined_input_warns() {
        let cfg = config(json!({
            "anchors": {"a1": {"source": "s1", "features": ["f1"]}},
            "derivations": {
                "f2": {"definition": "a", "inputs": [{"key": "k", "feature": "remote_feature"}]}
            }
        }));
        let r = FeatureDefRules::new().validate(&cfg);
        assert_eq!(r.status(), ValidationStatus::Warn);
        assert!(r.message().unwrap().contains("remote_feature (input of f2)"));
    }

    #[test]
    fn test_most_severe_finding_wins_and_all_reported() {
        let cfg = config(json!({
            "anchors": {
                "a1": {"source": "s1", "features": ["f1"]},
                "a2": {"source": "s1", "features": ["f1"]}
            },
            "derivations": {"f2": {"inputs": {"x": {"feature": "missing"}}}}
        }));
        let r = FeatureDefRules::new().validate(&cfg);
        assert_eq!(r.status(), ValidationStatus::Invalid);
        let msg = r.message().unwrap();
        assert!(msg.contains("defined more than once"));
        assert!(msg.contains("missing (input of f2)"));
    }
}
